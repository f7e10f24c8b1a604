use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::manager::{TaskFilter, TaskManager};
use crate::model::Task;
use crate::store::backend::StorageBackend;

fn listed(tasks: Vec<Task>, empty_message: &str) -> CmdResult {
    let mut result = CmdResult::default();
    if tasks.is_empty() {
        result.add_message(CmdMessage::info(empty_message));
    }
    result.with_listed_tasks(tasks)
}

pub fn run<B: StorageBackend>(manager: &TaskManager<B>, filter: &TaskFilter) -> Result<CmdResult> {
    Ok(listed(manager.filter(filter), "No tasks match the current filters."))
}

pub fn search<B: StorageBackend>(manager: &TaskManager<B>, query: &str) -> Result<CmdResult> {
    Ok(listed(
        manager.search(query),
        &format!("No tasks found matching \"{}\".", query.trim()),
    ))
}

pub fn overdue<B: StorageBackend>(manager: &TaskManager<B>) -> Result<CmdResult> {
    Ok(listed(manager.overdue_tasks(), "No overdue tasks."))
}

pub fn due_today<B: StorageBackend>(manager: &TaskManager<B>) -> Result<CmdResult> {
    Ok(listed(manager.tasks_due_today(), "Nothing due today."))
}

pub fn by_category<B: StorageBackend>(manager: &TaskManager<B>) -> Result<CmdResult> {
    let groups = manager.group_by_category();
    let mut result = CmdResult::default();
    if groups.is_empty() {
        result.add_message(CmdMessage::info("No tasks yet."));
    }
    Ok(result.with_groups(groups))
}
