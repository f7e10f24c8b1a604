use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::manager::TaskManager;
use crate::store::backend::StorageBackend;

pub fn run<B: StorageBackend>(manager: &TaskManager<B>) -> Result<CmdResult> {
    let json = manager.export_tasks()?;

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!(
        "Exported {} task(s).",
        manager.len()
    )));
    Ok(result.with_export(json))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NewTask;
    use crate::store::mem_backend::MemBackend;
    use serde_json::Value;

    #[test]
    fn export_payload_has_metadata() {
        let mut manager = TaskManager::with_backend(MemBackend::new());
        manager.create(NewTask::new("a")).unwrap();

        let result = run(&manager).unwrap();
        let value: Value = serde_json::from_str(result.export.as_deref().unwrap()).unwrap();
        assert_eq!(value["totalTasks"], 1);
        assert_eq!(value["tasks"][0]["title"], "a");
        assert_eq!(result.message(), Some("Exported 1 task(s)."));
    }
}
