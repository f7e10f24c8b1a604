use super::adapter::DurableStore;
use super::backend::StorageBackend;
use super::validate::validate_stored;
use super::{LoadResult, LoadSource, SaveOptions, SaveReceipt, StorageInfo, StorageKeys};
use crate::config::TaskzConfig;
use crate::error::{Result, TaskzError};
use crate::model::{Envelope, EnvelopeMetadata, Task};
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::cell::Cell;
use tracing::{debug, info, warn};

/// Storage manager: owns the envelope format and wires the adapter,
/// backup, validation and migration pieces together.
pub struct TaskStore<B: StorageBackend> {
    pub(crate) store: DurableStore<B>,
    pub(crate) keys: StorageKeys,
    pub(crate) schema_version: String,
    pub(crate) migrated: Cell<bool>,
}

/// A primary envelope that passed validation and decoded into tasks.
pub(crate) struct DecodedEnvelope {
    pub tasks: Vec<Task>,
    pub metadata: Option<EnvelopeMetadata>,
    pub timestamp: Option<DateTime<Utc>>,
}

/// Parse, validate and decode a serialized envelope. `None` means corrupt.
///
/// An id of `u64::MAX` leaves no successor for the id counter and is treated
/// as corruption.
pub(crate) fn decode_envelope(raw: &str) -> Option<DecodedEnvelope> {
    let mut value: Value = serde_json::from_str(raw).ok()?;
    if !validate_stored(&value) {
        return None;
    }
    let tasks: Vec<Task> = serde_json::from_value(value["tasks"].take()).ok()?;
    if tasks.iter().any(|t| t.id.checked_add(1).is_none()) {
        return None;
    }
    let metadata = value
        .get_mut("metadata")
        .map(Value::take)
        .and_then(|m| serde_json::from_value(m).ok());
    let timestamp = value
        .get("timestamp")
        .and_then(Value::as_str)
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc));
    Some(DecodedEnvelope {
        tasks,
        metadata,
        timestamp,
    })
}

impl<B: StorageBackend> TaskStore<B> {
    /// Open the store: check the medium, migrate if the schema version
    /// changed, and take an initial backup when none exists yet.
    pub fn open(backend: B, config: &TaskzConfig) -> Self {
        let store = Self {
            store: DurableStore::open(backend),
            keys: config.storage_keys(),
            schema_version: config.schema_version.clone(),
            migrated: Cell::new(false),
        };

        if !store.is_memory_mode() {
            store.check_and_migrate();
            if !store.has_backup() {
                store.snapshot();
            }
        }

        store
    }

    pub fn with_backend(backend: B) -> Self {
        Self::open(backend, &TaskzConfig::default())
    }

    pub fn keys(&self) -> &StorageKeys {
        &self.keys
    }

    pub fn schema_version(&self) -> &str {
        &self.schema_version
    }

    pub fn adapter(&self) -> &DurableStore<B> {
        &self.store
    }

    pub fn is_memory_mode(&self) -> bool {
        self.store.is_memory_mode()
    }

    pub fn has_backup(&self) -> bool {
        self.store.read(&self.keys.backup).is_some()
    }

    /// Persist the full collection as a fresh envelope.
    ///
    /// On a full medium the stale-key cleanup runs and `QuotaExceeded` is
    /// returned; the write is not retried.
    pub fn save_tasks(&self, tasks: &[Task], options: SaveOptions) -> Result<SaveReceipt> {
        let envelope = Envelope::new(tasks, &self.schema_version);
        let serialized = serde_json::to_string(&envelope)?;

        if options.create_backup {
            self.snapshot();
        }

        match self.store.write(&self.keys.data, &serialized) {
            Ok(()) => {
                debug!(target: "taskz::store", tasks = tasks.len(), "Tasks saved");
                Ok(SaveReceipt {
                    timestamp: envelope.timestamp,
                    task_count: tasks.len(),
                    in_memory: self.is_memory_mode(),
                })
            }
            Err(TaskzError::QuotaExceeded) => {
                let removed = self.cleanup_old_data();
                warn!(
                    target: "taskz::store",
                    removed,
                    "Storage quota exceeded; removed stale keys, save not retried"
                );
                Err(TaskzError::QuotaExceeded)
            }
            Err(e) => {
                warn!(target: "taskz::store", error = %e, "Saving tasks failed");
                Err(e)
            }
        }
    }

    /// Load the collection. Never fails: falls back to the backup, then to an
    /// empty collection.
    pub fn load_tasks(&self) -> LoadResult {
        let Some(raw) = self.store.read(&self.keys.data) else {
            if self.is_memory_mode() {
                return LoadResult {
                    source: LoadSource::Memory,
                    ..LoadResult::empty()
                };
            }
            return LoadResult::empty();
        };

        match decode_envelope(&raw) {
            Some(decoded) => LoadResult {
                tasks: decoded.tasks,
                source: if self.is_memory_mode() {
                    LoadSource::Memory
                } else {
                    LoadSource::Storage
                },
                restored: false,
                backup_timestamp: None,
                metadata: decoded.metadata,
                timestamp: decoded.timestamp,
            },
            None => {
                warn!(target: "taskz::store", "Stored data is corrupt, attempting recovery from backup");
                self.restore()
            }
        }
    }

    /// Remove the primary envelope, keeping a final backup of it.
    pub fn clear_all_data(&self) -> Result<()> {
        self.snapshot();
        self.store.remove(&self.keys.data)?;
        info!(target: "taskz::store", "All data cleared, backup kept");
        Ok(())
    }

    /// Remove every key in the namespace other than the data, backup and
    /// version slots. Returns the number of keys removed.
    pub fn cleanup_old_data(&self) -> usize {
        let mut removed = 0;
        for key in self.store.list_keys() {
            if !self.keys.is_stale(&key) {
                continue;
            }
            match self.store.remove(&key) {
                Ok(()) => removed += 1,
                Err(e) => warn!(target: "taskz::store", key = %key, error = %e, "Could not remove stale key"),
            }
        }
        removed
    }

    pub fn storage_info(&self) -> StorageInfo {
        StorageInfo {
            is_memory_mode: self.is_memory_mode(),
            version: self.schema_version.clone(),
            has_backup: self.has_backup(),
            storage_used: (self.store.used_bytes() + 512) / 1024,
            storage_available: self.store.is_available(),
        }
    }
}
