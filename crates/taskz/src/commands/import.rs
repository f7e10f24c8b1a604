use crate::commands::{push_storage_warning, CmdMessage, CmdResult};
use crate::error::Result;
use crate::manager::TaskManager;
use crate::store::backend::StorageBackend;

/// Append the valid tasks of an export file.
pub fn run<B: StorageBackend>(manager: &mut TaskManager<B>, json: &str) -> Result<CmdResult> {
    let imported = manager.import_tasks(json)?;

    let mut result = CmdResult::default();
    if imported == 0 {
        result.add_message(CmdMessage::info("No valid tasks found to import."));
    } else {
        result.add_message(CmdMessage::success(format!(
            "Imported {} task(s).",
            imported
        )));
    }
    push_storage_warning(manager, &mut result);
    Ok(result)
}

/// Replace the whole collection with an export file.
pub fn replace<B: StorageBackend>(manager: &mut TaskManager<B>, json: &str) -> Result<CmdResult> {
    let count = manager.replace_from_export(json)?;

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!(
        "Replaced collection with {} task(s). The previous data was backed up.",
        count
    )));
    push_storage_warning(manager, &mut result);
    Ok(result)
}
