//! # Startup
//!
//! [`initialize`] builds the one [`TaskzContext`] an application needs: it resolves the
//! data directory, loads configuration, opens the filesystem medium (falling back to
//! memory if it is unusable), runs migration and populates the collection.
//!
//! ## Data Directory
//!
//! 1. If `data_override` is provided, it is used as-is.
//! 2. Otherwise `TASKZ_DATA` is checked (primarily for testing).
//! 3. Otherwise the OS data directory for `taskz` (via the `directories` crate).
//!
//! If none can be determined the medium has no root, fails its write check, and the session
//! runs in memory mode.
//!
//! ## Configuration
//!
//! `taskz.toml` is looked up in the data directory and merged over the compiled
//! defaults. A missing or broken file yields the defaults.

use crate::api::TaskzApi;
use crate::config::TaskzConfig;
use crate::manager::TaskManager;
use crate::store::fs_backend::FsBackend;
use crate::store::TaskStore;
use clapfig::{Clapfig, SearchMode, SearchPath};
use directories::ProjectDirs;
use std::path::PathBuf;
use tracing::info;

pub struct TaskzContext {
    pub api: TaskzApi<FsBackend>,
    pub config: TaskzConfig,
    pub data_dir: Option<PathBuf>,
}

fn resolve_data_dir(data_override: Option<PathBuf>) -> Option<PathBuf> {
    data_override
        .or_else(|| std::env::var("TASKZ_DATA").ok().map(PathBuf::from))
        .or_else(|| {
            ProjectDirs::from("com", "taskz", "taskz").map(|dirs| dirs.data_dir().to_path_buf())
        })
}

fn load_config(data_dir: Option<&PathBuf>) -> TaskzConfig {
    let Some(dir) = data_dir else {
        return TaskzConfig::default();
    };
    Clapfig::builder()
        .app_name("taskz")
        .file_name("taskz.toml")
        .search_paths(vec![SearchPath::Path(dir.clone())])
        .search_mode(SearchMode::Merge)
        .load()
        .unwrap_or_default()
}

/// Initialize the taskz context.
///
/// # Examples
///
/// ```ignore
/// // OS data directory
/// let ctx = initialize(None);
///
/// // Explicit data directory
/// let ctx = initialize(Some(PathBuf::from("/tmp/my-tasks")));
/// ```
pub fn initialize(data_override: Option<PathBuf>) -> TaskzContext {
    let data_dir = resolve_data_dir(data_override);
    let config = load_config(data_dir.as_ref());

    let backend = FsBackend::new(data_dir.clone()).with_quota(config.quota_bytes);
    let store = TaskStore::open(backend, &config);
    let manager = TaskManager::open(store);
    info!(
        target: "taskz::init",
        data_dir = ?data_dir,
        tasks = manager.len(),
        memory_mode = manager.store().is_memory_mode(),
        "taskz initialized"
    );

    TaskzContext {
        api: TaskzApi::new(manager),
        config,
        data_dir,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NewTask;
    use std::fs;

    #[test]
    fn initialize_uses_override_dir() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctx = initialize(Some(dir.path().to_path_buf()));
        assert_eq!(ctx.data_dir.as_deref(), Some(dir.path()));
        assert!(!ctx.api.manager().store().is_memory_mode());

        ctx.api.create_task(NewTask::new("On disk")).unwrap();
        assert!(dir.path().join("taskManager_data.json").exists());
        assert!(dir.path().join("taskManager_version.json").exists());
    }

    #[test]
    fn initialize_reads_config_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("taskz.toml"), "namespace = \"work\"\n").unwrap();

        let mut ctx = initialize(Some(dir.path().to_path_buf()));
        assert_eq!(ctx.config.namespace, "work");
        assert_eq!(ctx.config.schema_version, "1.0.0");

        ctx.api.create_task(NewTask::new("Namespaced")).unwrap();
        assert!(dir.path().join("work_data.json").exists());
    }

    #[test]
    fn reinitialize_sees_saved_tasks() {
        let dir = tempfile::tempdir().unwrap();
        {
            let mut ctx = initialize(Some(dir.path().to_path_buf()));
            ctx.api.create_task(NewTask::new("Persisted")).unwrap();
        }
        let ctx = initialize(Some(dir.path().to_path_buf()));
        assert_eq!(ctx.api.manager().tasks()[0].title, "Persisted");
    }
}
