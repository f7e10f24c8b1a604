use crate::commands::{push_storage_warning, CmdMessage, CmdResult};
use crate::error::Result;
use crate::manager::TaskManager;
use crate::model::NewTask;
use crate::store::backend::StorageBackend;

pub fn run<B: StorageBackend>(manager: &mut TaskManager<B>, input: NewTask) -> Result<CmdResult> {
    let task = manager.create(input)?;

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!("Task created: {}", task.title)));
    push_storage_warning(manager, &mut result);
    Ok(result.with_affected_tasks(vec![task]))
}
