use crate::commands::{push_storage_warning, CmdMessage, CmdResult};
use crate::error::{Result, TaskzError};
use crate::manager::TaskManager;
use crate::store::backend::StorageBackend;

pub fn run<B: StorageBackend>(manager: &mut TaskManager<B>, id: u64) -> Result<CmdResult> {
    let task = manager.get(id).cloned().ok_or(TaskzError::NotFound(id))?;
    manager.delete(id);

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!("Task deleted: {}", task.title)));
    push_storage_warning(manager, &mut result);
    Ok(result.with_affected_tasks(vec![task]))
}

/// Remove every completed task.
pub fn completed<B: StorageBackend>(manager: &mut TaskManager<B>) -> Result<CmdResult> {
    let removed = manager.delete_completed();

    let mut result = CmdResult::default();
    if removed == 0 {
        result.add_message(CmdMessage::info("No completed tasks to delete."));
    } else {
        result.add_message(CmdMessage::success(format!(
            "Deleted {} completed task(s).",
            removed
        )));
    }
    push_storage_warning(manager, &mut result);
    Ok(result)
}
