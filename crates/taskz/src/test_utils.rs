use crate::manager::TaskManager;
use crate::store::fs_backend::FsBackend;
use std::path::PathBuf;
use tempfile::TempDir;

/// Install a test-writer subscriber so `tracing` output shows up for failing tests.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

pub struct TestEnv {
    // We keep _temp_dir to ensure the directory is not dropped until the test is done
    pub _temp_dir: TempDir,
    pub root: PathBuf,
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}

impl TestEnv {
    pub fn new() -> Self {
        init_test_tracing();
        let temp_dir = tempfile::tempdir().expect("failed to create temp dir");
        let root = temp_dir.path().to_path_buf();
        Self {
            _temp_dir: temp_dir,
            root,
        }
    }

    pub fn backend(&self) -> FsBackend {
        FsBackend::new(Some(self.root.clone()))
    }

    /// A fresh manager over the temp dir. Opening twice simulates a restart.
    pub fn manager(&self) -> TaskManager<FsBackend> {
        TaskManager::with_backend(self.backend())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NewTask;
    use crate::store::LoadSource;
    use std::fs;

    #[test]
    fn restart_keeps_tasks() {
        let env = TestEnv::new();
        {
            let mut manager = env.manager();
            manager.create(NewTask::new("Survives restart")).unwrap();
        }

        let manager = env.manager();
        assert_eq!(manager.last_load(), LoadSource::Storage);
        assert_eq!(manager.tasks()[0].title, "Survives restart");
    }

    #[test]
    fn corrupt_file_recovers_after_restart() {
        let env = TestEnv::new();
        {
            let mut manager = env.manager();
            manager.create(NewTask::new("first")).unwrap();
            manager.create(NewTask::new("second")).unwrap();
        }
        fs::write(env.root.join("taskManager_data.json"), "{\"tasks\": [").unwrap();

        let manager = env.manager();
        assert_eq!(manager.last_load(), LoadSource::Backup);
        assert_eq!(manager.len(), 1);
    }
}
