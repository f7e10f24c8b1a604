use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::manager::TaskManager;
use crate::store::backend::StorageBackend;
use crate::store::LoadSource;

/// Report storage health and remove stale keys from the namespace.
pub fn run<B: StorageBackend>(manager: &mut TaskManager<B>) -> Result<CmdResult> {
    let removed = manager.store().cleanup_old_data();
    let info = manager.storage_info();
    let mut result = CmdResult::default();

    if info.is_memory_mode {
        result.add_message(CmdMessage::warning(
            "Storage is unavailable. Changes are kept in memory and will be lost on exit.",
        ));
    } else if !info.storage_available {
        result.add_message(CmdMessage::warning(
            "Storage stopped accepting writes since startup.",
        ));
    } else {
        result.add_message(CmdMessage::success("Storage is available."));
    }

    if manager.last_load() == LoadSource::Backup {
        result.add_message(CmdMessage::warning(
            "Stored data was corrupt at last load; tasks were restored from the backup.",
        ));
    }
    if !info.has_backup {
        result.add_message(CmdMessage::info("No backup has been taken yet."));
    }
    if removed > 0 {
        result.add_message(CmdMessage::info(format!(
            "Removed {} stale storage key(s).",
            removed
        )));
    }
    result.add_message(CmdMessage::info(format!(
        "Schema version {}, about {} KiB used.",
        info.version, info.storage_used
    )));

    Ok(result.with_storage(info))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NewTask;
    use crate::store::backend::StorageBackend as _;
    use crate::store::mem_backend::MemBackend;

    #[test]
    fn healthy_storage() {
        let mut manager = TaskManager::with_backend(MemBackend::new());
        manager.create(NewTask::new("a")).unwrap();
        manager.create(NewTask::new("b")).unwrap();

        let result = run(&mut manager).unwrap();
        assert!(result.success());
        assert_eq!(result.message(), Some("Storage is available."));
        let storage = result.storage.unwrap();
        assert!(storage.has_backup);
        assert!(!storage.is_memory_mode);
    }

    #[test]
    fn removes_stale_keys() {
        let backend = MemBackend::new();
        backend.insert_raw("taskManager_cache", "x");
        backend.insert_raw("taskManager_old", "y");
        let mut manager = TaskManager::with_backend(backend);

        let result = run(&mut manager).unwrap();
        assert!(result
            .messages
            .iter()
            .any(|m| m.content == "Removed 2 stale storage key(s)."));
        let durable = manager.store().adapter().durable().unwrap();
        assert_eq!(durable.get("taskManager_cache").unwrap(), None);
    }

    #[test]
    fn memory_mode_is_a_warning() {
        let backend = MemBackend::new();
        backend.set_simulate_unavailable(true);
        let mut manager = TaskManager::with_backend(backend);

        let result = run(&mut manager).unwrap();
        assert!(result.success());
        assert!(result.message().unwrap().contains("in memory"));
        assert!(result.storage.unwrap().is_memory_mode);
    }

    #[test]
    fn reports_backup_recovery() {
        let mut manager = TaskManager::with_backend(MemBackend::new());
        manager.create(NewTask::new("a")).unwrap();
        manager.create(NewTask::new("b")).unwrap();
        manager
            .store()
            .adapter()
            .write("taskManager_data", "{broken")
            .unwrap();
        manager.reload();

        let result = run(&mut manager).unwrap();
        assert!(result
            .messages
            .iter()
            .any(|m| m.content.contains("restored from the backup")));
    }
}
