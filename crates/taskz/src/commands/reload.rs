use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::manager::TaskManager;
use crate::store::backend::StorageBackend;
use crate::store::LoadSource;

/// Re-read the collection from storage, discarding unsaved in-memory state.
pub fn run<B: StorageBackend>(manager: &mut TaskManager<B>) -> Result<CmdResult> {
    let loaded = manager.reload();

    let mut result = CmdResult::default();
    match loaded.source {
        LoadSource::Backup => {
            let when = loaded
                .backup_timestamp
                .map(|ts| format!(" taken {}", ts.to_rfc3339()))
                .unwrap_or_default();
            result.add_message(CmdMessage::warning(format!(
                "Stored data was corrupt. Restored {} task(s) from the backup{}.",
                loaded.tasks.len(),
                when
            )));
        }
        LoadSource::Default => result.add_message(CmdMessage::info("No saved tasks found.")),
        LoadSource::Storage | LoadSource::Memory => result.add_message(CmdMessage::success(
            format!("Loaded {} task(s).", loaded.tasks.len()),
        )),
    }
    Ok(result.with_listed_tasks(loaded.tasks))
}
