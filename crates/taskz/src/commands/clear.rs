use crate::commands::{push_storage_warning, CmdMessage, CmdResult};
use crate::error::Result;
use crate::manager::TaskManager;
use crate::store::backend::StorageBackend;

/// Empty the collection. The pre-clear state stays in the backup slot.
pub fn run<B: StorageBackend>(manager: &mut TaskManager<B>) -> Result<CmdResult> {
    let cleared = manager.clear_all();

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!("Cleared {} task(s).", cleared)));
    push_storage_warning(manager, &mut result);
    Ok(result)
}

/// Delete the stored collection. A final backup of it is kept.
pub fn wipe<B: StorageBackend>(manager: &mut TaskManager<B>) -> Result<CmdResult> {
    let cleared = manager.wipe_storage();

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!(
        "Removed {} stored task(s). A backup was kept.",
        cleared
    )));
    push_storage_warning(manager, &mut result);
    Ok(result)
}
