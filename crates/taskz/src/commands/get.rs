use crate::commands::CmdResult;
use crate::error::{Result, TaskzError};
use crate::manager::TaskManager;
use crate::store::backend::StorageBackend;

pub fn run<B: StorageBackend>(manager: &TaskManager<B>, id: u64) -> Result<CmdResult> {
    let task = manager.get(id).cloned().ok_or(TaskzError::NotFound(id))?;
    Ok(CmdResult::default().with_listed_tasks(vec![task]))
}
