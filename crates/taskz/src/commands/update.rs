use crate::commands::{push_storage_warning, CmdMessage, CmdResult};
use crate::error::{Result, TaskzError};
use crate::manager::TaskManager;
use crate::model::TaskUpdate;
use crate::store::backend::StorageBackend;

pub fn run<B: StorageBackend>(
    manager: &mut TaskManager<B>,
    id: u64,
    update: TaskUpdate,
) -> Result<CmdResult> {
    let task = manager.update(id, update)?;

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!("Task updated: {}", task.title)));
    push_storage_warning(manager, &mut result);
    Ok(result.with_affected_tasks(vec![task]))
}

pub fn toggle<B: StorageBackend>(manager: &mut TaskManager<B>, id: u64) -> Result<CmdResult> {
    let task = manager.toggle(id).ok_or(TaskzError::NotFound(id))?;

    let mut result = CmdResult::default();
    let verb = if task.completed { "completed" } else { "reopened" };
    result.add_message(CmdMessage::success(format!("Task {}: {}", verb, task.title)));
    push_storage_warning(manager, &mut result);
    Ok(result.with_affected_tasks(vec![task]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NewTask;
    use crate::store::mem_backend::MemBackend;

    fn setup() -> TaskManager<MemBackend> {
        let mut manager = TaskManager::with_backend(MemBackend::new());
        manager.create(NewTask::new("Draft")).unwrap();
        manager
    }

    #[test]
    fn update_reports_new_title() {
        let mut manager = setup();
        let result = run(&mut manager, 1, TaskUpdate::new().title("Final")).unwrap();
        assert_eq!(result.message(), Some("Task updated: Final"));
        assert_eq!(result.affected_tasks[0].title, "Final");
    }

    #[test]
    fn update_missing_task() {
        let mut manager = setup();
        let err = run(&mut manager, 5, TaskUpdate::new().title("x")).unwrap_err();
        assert!(matches!(err, TaskzError::NotFound(5)));
    }

    #[test]
    fn toggle_reports_direction() {
        let mut manager = setup();
        let result = toggle(&mut manager, 1).unwrap();
        assert_eq!(result.message(), Some("Task completed: Draft"));
        assert!(result.affected_tasks[0].completed_at.is_some());

        let result = toggle(&mut manager, 1).unwrap();
        assert_eq!(result.message(), Some("Task reopened: Draft"));
        assert!(result.affected_tasks[0].completed_at.is_none());
    }

    #[test]
    fn toggle_missing_task() {
        let mut manager = setup();
        assert!(matches!(toggle(&mut manager, 2), Err(TaskzError::NotFound(2))));
    }
}
