use crate::commands::{push_storage_warning, CmdMessage, CmdResult};
use crate::error::Result;
use crate::manager::TaskManager;
use crate::store::backend::StorageBackend;

/// Mark every pending task completed.
pub fn all<B: StorageBackend>(manager: &mut TaskManager<B>) -> Result<CmdResult> {
    let count = manager.mark_all_completed();

    let mut result = CmdResult::default();
    if count == 0 {
        result.add_message(CmdMessage::info("All tasks are already completed."));
    } else {
        result.add_message(CmdMessage::success(format!(
            "Marked {} task(s) as completed.",
            count
        )));
    }
    push_storage_warning(manager, &mut result);
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NewTask;
    use crate::store::mem_backend::MemBackend;

    #[test]
    fn completes_pending_tasks_once() {
        let mut manager = TaskManager::with_backend(MemBackend::new());
        manager.create(NewTask::new("a")).unwrap();
        manager.create(NewTask::new("b")).unwrap();

        let result = all(&mut manager).unwrap();
        assert_eq!(result.message(), Some("Marked 2 task(s) as completed."));
        assert!(manager.tasks().iter().all(|t| t.completed));

        let result = all(&mut manager).unwrap();
        assert_eq!(result.message(), Some("All tasks are already completed."));
    }
}
