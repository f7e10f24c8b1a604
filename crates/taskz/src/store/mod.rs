//! # Storage Layer
//!
//! This module defines the persistence stack for taskz. Everything the task
//! manager persists goes through [`task_store::TaskStore`], which sits on top of a
//! raw key-value medium.
//!
//! ## Layers
//!
//! ```text
//! TaskStore            envelopes, save/load, clear, cleanup, diagnostics
//!   ├─ backup          snapshot before writes, restore on corruption
//!   ├─ migrate         one-shot schema upgrade at startup
//!   ├─ validate        structural checks on raw JSON
//!   └─ DurableStore    availability check + in-memory fallback
//!        └─ StorageBackend   FsBackend (production) / MemBackend (fallback, tests)
//! ```
//!
//! ## Key Layout
//!
//! Three logical keys live under a namespace (default `taskManager`):
//!
//! ```text
//! taskManager_data      # Envelope {tasks, timestamp, schemaVersion, metadata}
//! taskManager_backup    # {data: "<envelope json>", timestamp, schemaVersion}
//! taskManager_version   # Bare version string, e.g. 1.0.0
//! ```
//!
//! With [`fs_backend::FsBackend`] each key is a `<key>.json` file in the data directory.
//!
//! ## Failure Philosophy
//!
//! The medium may be absent, full, or corrupted. Loading never fails: a corrupt
//! primary falls back to the backup, a corrupt backup falls back to an empty
//! collection. Snapshots never block the write that triggered them. A full
//! medium triggers a cleanup of stale namespace keys and is reported, not retried.

use crate::model::{EnvelopeMetadata, Task};
use chrono::{DateTime, Utc};
use serde::Serialize;

pub mod adapter;
pub mod backend;
pub mod backup;
pub mod fs_backend;
pub mod mem_backend;
pub mod migrate;
pub mod task_store;
pub mod validate;

pub use task_store::TaskStore;

/// Names of the keys used under one namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageKeys {
    pub namespace: String,
    pub data: String,
    pub backup: String,
    pub version: String,
}

impl StorageKeys {
    pub fn new(namespace: &str) -> Self {
        Self {
            namespace: namespace.to_string(),
            data: format!("{}_data", namespace),
            backup: format!("{}_backup", namespace),
            version: format!("{}_version", namespace),
        }
    }

    /// A key inside the namespace that none of the three slots own.
    pub fn is_stale(&self, key: &str) -> bool {
        key.strip_prefix(self.namespace.as_str())
            .is_some_and(|rest| rest.starts_with('_'))
            && key != self.data
            && key != self.backup
            && key != self.version
    }
}

/// Where the tasks returned by a load came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadSource {
    /// Primary envelope on the durable medium.
    Storage,
    /// Primary envelope in the in-memory fallback.
    Memory,
    /// Primary missing or invalid; recovered from the backup slot.
    Backup,
    /// Nothing usable found.
    Default,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadResult {
    pub tasks: Vec<Task>,
    pub source: LoadSource,
    pub restored: bool,
    pub backup_timestamp: Option<DateTime<Utc>>,
    /// Display only; never used to drive logic.
    pub metadata: Option<EnvelopeMetadata>,
    pub timestamp: Option<DateTime<Utc>>,
}

impl LoadResult {
    pub fn empty() -> Self {
        Self {
            tasks: Vec::new(),
            source: LoadSource::Default,
            restored: false,
            backup_timestamp: None,
            metadata: None,
            timestamp: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaveOptions {
    /// Snapshot the current primary envelope before overwriting it.
    pub create_backup: bool,
}

impl Default for SaveOptions {
    fn default() -> Self {
        Self {
            create_backup: true,
        }
    }
}

impl SaveOptions {
    pub fn without_backup() -> Self {
        Self {
            create_backup: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SaveReceipt {
    pub timestamp: DateTime<Utc>,
    pub task_count: usize,
    pub in_memory: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageInfo {
    pub is_memory_mode: bool,
    pub version: String,
    pub has_backup: bool,
    /// Approximate KiB held by all keys.
    pub storage_used: u64,
    pub storage_available: bool,
}
