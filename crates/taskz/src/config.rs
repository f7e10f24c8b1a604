//! # Configuration
//!
//! Taskz configuration is managed by [`clapfig`], which handles layered loading
//! from TOML files and programmatic overrides.
//!
//! ## Storage Hierarchy
//!
//! Configuration is resolved in priority order:
//! 1. **Data-directory Config**: `<data_dir>/taskz.toml`.
//! 2. **Compiled Defaults**: Built-in fallbacks via `#[config(default = ...)]`.
//!
//! ## Available Settings
//!
//! | Key | Default | Description |
//! |-----|---------|-------------|
//! | `namespace` | `taskManager` | Prefix for every storage key |
//! | `schema_version` | `1.0.0` | Version marker written after migration |
//! | `quota_bytes` | unset | Byte cap for the filesystem medium |

use confique::Config;
use serde::{Deserialize, Serialize};

use crate::store::StorageKeys;

/// Configuration for taskz, stored in `taskz.toml`.
#[derive(Config, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct TaskzConfig {
    /// Prefix for the data, backup and version keys.
    #[config(default = "taskManager")]
    pub namespace: String,

    /// Schema version of the persisted envelope. A different stored marker
    /// triggers migration at startup.
    #[config(default = "1.0.0")]
    pub schema_version: String,

    /// Maximum bytes the filesystem medium may hold. Unlimited when absent.
    pub quota_bytes: Option<u64>,
}

impl Default for TaskzConfig {
    fn default() -> Self {
        Self {
            namespace: "taskManager".to_string(),
            schema_version: "1.0.0".to_string(),
            quota_bytes: None,
        }
    }
}

impl TaskzConfig {
    pub fn storage_keys(&self) -> StorageKeys {
        StorageKeys::new(self.namespace.trim())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = TaskzConfig::default();
        assert_eq!(config.namespace, "taskManager");
        assert_eq!(config.schema_version, "1.0.0");
        assert_eq!(config.quota_bytes, None);
    }

    #[test]
    fn test_storage_keys_follow_namespace() {
        let config = TaskzConfig {
            namespace: "work".to_string(),
            ..Default::default()
        };
        let keys = config.storage_keys();
        assert_eq!(keys.data, "work_data");
        assert_eq!(keys.backup, "work_backup");
        assert_eq!(keys.version, "work_version");
    }

    #[test]
    fn test_parses_from_toml() {
        let config: TaskzConfig = toml::from_str(
            r#"
            namespace = "home"
            schema_version = "2.0.0"
            quota_bytes = 4096
            "#,
        )
        .unwrap();
        assert_eq!(config.namespace, "home");
        assert_eq!(config.schema_version, "2.0.0");
        assert_eq!(config.quota_bytes, Some(4096));
    }
}
