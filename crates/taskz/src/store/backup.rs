//! Backup slot handling.
//!
//! The backup slot holds the last-known-good primary envelope, serialized as a
//! string inside a [`BackupEnvelope`]. A snapshot is taken before every primary
//! write and before destructive operations; it is skipped when the current
//! primary is missing or fails validation, so a corrupt primary never
//! overwrites a good backup.

use super::backend::StorageBackend;
use super::task_store::{decode_envelope, TaskStore};
use super::{LoadResult, LoadSource};
use crate::model::BackupEnvelope;
use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

impl<B: StorageBackend> TaskStore<B> {
    /// Copy the current primary envelope into the backup slot.
    /// Failures are logged and swallowed.
    pub fn snapshot(&self) {
        let Some(current) = self.store.read(&self.keys.data) else {
            return;
        };
        if decode_envelope(&current).is_none() {
            warn!(target: "taskz::backup", "Primary envelope is invalid, keeping previous backup");
            return;
        }

        let backup = BackupEnvelope {
            data: current,
            timestamp: Utc::now(),
            schema_version: self.schema_version.clone(),
        };
        let serialized = match serde_json::to_string(&backup) {
            Ok(s) => s,
            Err(e) => {
                warn!(target: "taskz::backup", error = %e, "Could not serialize backup");
                return;
            }
        };

        match self.store.write(&self.keys.backup, &serialized) {
            Ok(()) => debug!(target: "taskz::backup", "Backup created"),
            Err(e) => warn!(target: "taskz::backup", error = %e, "Backup failed"),
        }
    }

    /// Recover tasks from the backup slot, or the empty default when the
    /// backup is missing or unusable. Never fails.
    pub fn restore(&self) -> LoadResult {
        let Some(raw) = self.store.read(&self.keys.backup) else {
            warn!(target: "taskz::backup", "No backup available");
            return LoadResult::empty();
        };

        let backup: BackupEnvelope = match serde_json::from_str(&raw) {
            Ok(b) => b,
            Err(e) => {
                warn!(target: "taskz::backup", error = %e, "Backup is unreadable");
                return LoadResult::empty();
            }
        };

        match decode_envelope(&backup.data) {
            Some(decoded) => {
                info!(
                    target: "taskz::backup",
                    tasks = decoded.tasks.len(),
                    backup_timestamp = %backup.timestamp,
                    "Data restored from backup"
                );
                LoadResult {
                    tasks: decoded.tasks,
                    source: LoadSource::Backup,
                    restored: true,
                    backup_timestamp: Some(backup.timestamp),
                    metadata: decoded.metadata,
                    timestamp: decoded.timestamp,
                }
            }
            None => {
                warn!(target: "taskz::backup", "Backup payload failed validation");
                LoadResult::empty()
            }
        }
    }

    /// When the current backup was taken, if there is a readable one.
    pub fn backup_timestamp(&self) -> Option<DateTime<Utc>> {
        let raw = self.store.read(&self.keys.backup)?;
        serde_json::from_str::<BackupEnvelope>(&raw)
            .ok()
            .map(|b| b.timestamp)
    }
}

#[cfg(test)]
mod tests {
    use crate::model::Task;
    use crate::store::mem_backend::MemBackend;
    use crate::store::task_store::TaskStore;
    use crate::store::{LoadSource, SaveOptions};
    use chrono::Utc;
    use serde_json::{json, Value};

    fn store_with_backup(titles: &[&str]) -> (TaskStore<MemBackend>, Vec<Task>) {
        let store = TaskStore::with_backend(MemBackend::new());
        let now = Utc::now();
        let tasks: Vec<Task> = titles
            .iter()
            .enumerate()
            .map(|(i, t)| Task::new(i as u64 + 1, t, now))
            .collect();
        store.save_tasks(&tasks, SaveOptions::default()).unwrap();
        store.snapshot();
        (store, tasks)
    }

    #[test]
    fn snapshot_without_primary_is_noop() {
        let store = TaskStore::with_backend(MemBackend::new());
        store.adapter().remove("taskManager_data").unwrap();
        store.adapter().remove("taskManager_backup").unwrap();
        store.snapshot();
        assert!(!store.has_backup());
        assert!(store.backup_timestamp().is_none());
    }

    #[test]
    fn snapshot_copies_primary_verbatim() {
        let (store, _) = store_with_backup(&["a", "b"]);
        let primary = store.adapter().read("taskManager_data").unwrap();
        let backup: Value =
            serde_json::from_str(&store.adapter().read("taskManager_backup").unwrap()).unwrap();

        assert_eq!(backup["data"].as_str().unwrap(), primary);
        assert_eq!(backup["schemaVersion"], "1.0.0");
        assert!(store.backup_timestamp().is_some());
    }

    #[test]
    fn snapshot_skips_corrupt_primary() {
        let (store, tasks) = store_with_backup(&["good"]);
        store
            .adapter()
            .write("taskManager_data", r#"{"tasks": 3}"#)
            .unwrap();

        store.snapshot();
        assert_eq!(store.restore().tasks, tasks);
    }

    #[test]
    fn snapshot_failure_is_swallowed() {
        let (store, _) = store_with_backup(&["a"]);
        store.adapter().durable().unwrap().set_simulate_write_error(true);
        // Must not panic or surface an error
        store.snapshot();
    }

    #[test]
    fn restore_returns_backup_tasks() {
        let (store, tasks) = store_with_backup(&["one", "two"]);
        let restored = store.restore();
        assert_eq!(restored.source, LoadSource::Backup);
        assert!(restored.restored);
        assert_eq!(restored.tasks, tasks);
    }

    #[test]
    fn restore_rejects_invalid_backup_payload() {
        let store = TaskStore::with_backend(MemBackend::new());
        let bad = json!({
            "data": r#"{"tasks": [{"title": "no id"}]}"#,
            "timestamp": "2024-01-01T00:00:00Z",
            "schemaVersion": "1.0.0"
        });
        store
            .adapter()
            .write("taskManager_backup", &bad.to_string())
            .unwrap();

        let restored = store.restore();
        assert_eq!(restored.source, LoadSource::Default);
        assert!(!restored.restored);
    }

    #[test]
    fn restore_handles_garbage_backup() {
        let store = TaskStore::with_backend(MemBackend::new());
        store.adapter().write("taskManager_backup", "garbage").unwrap();
        assert_eq!(store.restore().source, LoadSource::Default);
    }
}
