//! # Schema Migration
//!
//! At startup the stored version marker is compared with the configured schema
//! version. On mismatch (an absent marker counts) the stored tasks are upgraded
//! in place:
//!
//! 1. Raw tasks are read from the primary envelope, or from the backup if the
//!    primary is missing or invalid. A fresh install starts from an empty
//!    collection.
//! 2. Records missing `createdAt`, `category` or `priority` are backfilled.
//! 3. The collection is saved without an extra snapshot (the backup taken by
//!    earlier writes is the pre-migration copy).
//! 4. The new version marker is written.
//!
//! If any record still fails to decode after backfilling, nothing is saved and
//! the marker is left alone: the primary stays exactly as found and the next
//! open tries again. A primary that exists but is unusable, with no usable
//! backup either, is also left in place.
//!
//! Runs at most once per [`TaskStore`] and is a no-op once the marker matches.

use super::backend::StorageBackend;
use super::task_store::TaskStore;
use super::validate::validate_stored;
use super::SaveOptions;
use crate::model::{BackupEnvelope, Priority, Task, FALLBACK_CATEGORY};
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use tracing::{info, warn};

fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty(),
        Some(_) => false,
    }
}

/// Fill fields that older records lack. Returns true if anything changed.
pub fn backfill_legacy_fields(task: &mut Map<String, Value>, now: DateTime<Utc>) -> bool {
    let mut changed = false;
    if is_blank(task.get("createdAt")) {
        task.insert("createdAt".into(), Value::String(now.to_rfc3339()));
        changed = true;
    }
    if is_blank(task.get("category")) {
        task.insert("category".into(), Value::String(FALLBACK_CATEGORY.into()));
        changed = true;
    }
    if is_blank(task.get("priority")) {
        task.insert(
            "priority".into(),
            Value::String(Priority::default().as_str().into()),
        );
        changed = true;
    }
    changed
}

fn stored_tasks(raw: &str) -> Option<Vec<Value>> {
    let mut value: Value = serde_json::from_str(raw).ok()?;
    if !validate_stored(&value) {
        return None;
    }
    match value["tasks"].take() {
        Value::Array(tasks) => Some(tasks),
        _ => None,
    }
}

impl<B: StorageBackend> TaskStore<B> {
    pub fn stored_version(&self) -> Option<String> {
        self.store.read(&self.keys.version)
    }

    pub fn needs_migration(&self) -> bool {
        self.stored_version().as_deref() != Some(self.schema_version.as_str())
    }

    /// Run the migration if the version marker differs. Returns true if it ran.
    pub fn check_and_migrate(&self) -> bool {
        if self.migrated.get() || !self.needs_migration() {
            return false;
        }
        self.migrated.set(true);

        info!(
            target: "taskz::migrate",
            from = ?self.stored_version(),
            to = %self.schema_version,
            "Migrating stored data"
        );
        if !self.migrate_data() {
            return true;
        }

        if let Err(e) = self.store.write(&self.keys.version, &self.schema_version) {
            warn!(target: "taskz::migrate", error = %e, "Could not write version marker");
        }
        true
    }

    /// Upgrade the stored records. Returns false when the marker must not be
    /// written yet.
    fn migrate_data(&self) -> bool {
        let raw_tasks = match self.raw_tasks_for_migration() {
            Some(tasks) => tasks,
            None if self.store.read(&self.keys.data).is_none() => Vec::new(),
            None => {
                warn!(target: "taskz::migrate", "Stored data is unusable, leaving it for recovery");
                return true;
            }
        };

        let now = Utc::now();
        let mut backfilled = 0;
        let mut tasks = Vec::with_capacity(raw_tasks.len());
        for mut raw in raw_tasks {
            if let Some(obj) = raw.as_object_mut() {
                if backfill_legacy_fields(obj, now) {
                    backfilled += 1;
                }
            }
            match serde_json::from_value::<Task>(raw) {
                Ok(task) => tasks.push(task),
                Err(e) => {
                    warn!(
                        target: "taskz::migrate",
                        error = %e,
                        "Task cannot be upgraded, migration aborted and stored data left untouched"
                    );
                    return false;
                }
            }
        }

        match self.save_tasks(&tasks, SaveOptions::without_backup()) {
            Ok(_) => {
                info!(
                    target: "taskz::migrate",
                    tasks = tasks.len(),
                    backfilled,
                    "Migration completed"
                );
                true
            }
            Err(e) => {
                warn!(target: "taskz::migrate", error = %e, "Migration save failed");
                false
            }
        }
    }

    /// Raw task objects from the primary, else from the backup.
    /// `None` when neither slot holds a usable envelope.
    fn raw_tasks_for_migration(&self) -> Option<Vec<Value>> {
        if let Some(tasks) = self
            .store
            .read(&self.keys.data)
            .and_then(|raw| stored_tasks(&raw))
        {
            return Some(tasks);
        }

        let backup: BackupEnvelope = self
            .store
            .read(&self.keys.backup)
            .and_then(|raw| serde_json::from_str(&raw).ok())?;
        stored_tasks(&backup.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TaskzConfig;
    use crate::store::backend::StorageBackend;
    use crate::store::mem_backend::MemBackend;
    use serde_json::json;

    fn legacy_envelope() -> String {
        json!({
            "tasks": [
                {"id": 1, "title": "Legacy", "completed": false},
                {"id": 2, "title": "Has fields", "completed": true,
                 "priority": "high", "category": "work",
                 "createdAt": "2023-01-01T00:00:00Z"}
            ],
            "timestamp": "2023-01-01T00:00:00Z"
        })
        .to_string()
    }

    #[test]
    fn backfill_fills_only_missing_fields() {
        let now = Utc::now();
        let mut obj = json!({"title": "x", "category": "", "priority": "low"})
            .as_object()
            .cloned()
            .unwrap();
        assert!(backfill_legacy_fields(&mut obj, now));
        assert_eq!(obj["category"], "general");
        assert_eq!(obj["priority"], "low");
        assert!(obj["createdAt"].is_string());

        assert!(!backfill_legacy_fields(&mut obj, now));
    }

    #[test]
    fn migration_backfills_and_writes_marker() {
        let backend = MemBackend::new();
        backend.insert_raw("taskManager_data", &legacy_envelope());

        let store = TaskStore::with_backend(backend);
        assert_eq!(store.stored_version().as_deref(), Some("1.0.0"));

        let raw: Value =
            serde_json::from_str(&store.adapter().read("taskManager_data").unwrap()).unwrap();
        let first = &raw["tasks"][0];
        assert_eq!(first["category"], "general");
        assert_eq!(first["priority"], "medium");
        assert!(first["createdAt"].is_string());

        let second = &raw["tasks"][1];
        assert_eq!(second["category"], "work");
        assert_eq!(second["priority"], "high");
        assert_eq!(raw["schemaVersion"], "1.0.0");
    }

    #[test]
    fn migration_does_not_snapshot() {
        let backend = MemBackend::new();
        backend.insert_raw("taskManager_data", &legacy_envelope());
        backend.insert_raw("taskManager_version", "0.9.0");
        let store = TaskStore::open(backend, &TaskzConfig::default());

        // The only backup is the initial one taken after migration, so it
        // already holds the migrated envelope.
        let backup: BackupEnvelope =
            serde_json::from_str(&store.adapter().read("taskManager_backup").unwrap()).unwrap();
        assert!(backup.data.contains("\"category\":\"general\""));
    }

    #[test]
    fn migration_recovers_from_backup_when_primary_corrupt() {
        let backend = MemBackend::new();
        backend.insert_raw("taskManager_data", "{oops");
        let backup = json!({
            "data": legacy_envelope(),
            "timestamp": "2023-01-02T00:00:00Z",
            "schemaVersion": "0.9.0"
        });
        backend.insert_raw("taskManager_backup", &backup.to_string());

        let store = TaskStore::with_backend(backend);
        let loaded = store.load_tasks();
        assert_eq!(loaded.tasks.len(), 2);
        assert_eq!(loaded.tasks[0].title, "Legacy");
    }

    #[test]
    fn fresh_install_writes_empty_collection_and_marker() {
        let store = TaskStore::with_backend(MemBackend::new());
        assert_eq!(store.stored_version().as_deref(), Some("1.0.0"));

        let raw: Value =
            serde_json::from_str(&store.adapter().read("taskManager_data").unwrap()).unwrap();
        assert_eq!(raw["tasks"], json!([]));
        assert_eq!(raw["schemaVersion"], "1.0.0");
    }

    #[test]
    fn undecodable_record_aborts_migration_untouched() {
        let legacy = json!({
            "tasks": [
                {"id": "a1", "title": "Opaque id", "completed": false},
                {"id": 2, "title": "Numeric id", "completed": false}
            ]
        })
        .to_string();
        let backend = MemBackend::new();
        backend.insert_raw("taskManager_data", &legacy);

        let store = TaskStore::with_backend(backend);
        assert_eq!(store.adapter().read("taskManager_data").unwrap(), legacy);
        assert_eq!(store.stored_version(), None);
        assert!(!store.has_backup());
    }

    #[test]
    fn unusable_primary_without_backup_is_left_in_place() {
        let backend = MemBackend::new();
        backend.insert_raw("taskManager_data", "{oops");

        let store = TaskStore::with_backend(backend);
        assert_eq!(store.adapter().read("taskManager_data").unwrap(), "{oops");
        assert_eq!(store.stored_version().as_deref(), Some("1.0.0"));
    }

    #[test]
    fn migration_runs_once() {
        let backend = MemBackend::new();
        backend.insert_raw("taskManager_data", &legacy_envelope());
        let store = TaskStore::with_backend(backend);

        assert!(!store.needs_migration());
        assert!(!store.check_and_migrate());

        // Even if the marker is tampered with, a store migrates at most once
        store
            .adapter()
            .durable()
            .unwrap()
            .set("taskManager_version", "0.1.0")
            .unwrap();
        assert!(store.needs_migration());
        assert!(!store.check_and_migrate());
    }

    #[test]
    fn second_open_is_noop() {
        let backend = MemBackend::new();
        backend.insert_raw("taskManager_data", &legacy_envelope());
        let first = TaskStore::with_backend(backend);
        let before = first.adapter().read("taskManager_data").unwrap();

        // Reopen over a copy of everything the first store persisted
        let copy = MemBackend::new();
        for key in first.adapter().list_keys() {
            copy.insert_raw(&key, &first.adapter().read(&key).unwrap());
        }
        let second = TaskStore::with_backend(copy);
        assert!(!second.check_and_migrate());
        assert_eq!(second.adapter().read("taskManager_data").unwrap(), before);
    }
}
