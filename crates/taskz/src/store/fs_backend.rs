use super::backend::StorageBackend;
use crate::error::{Result, TaskzError};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use uuid::Uuid;

const VALUE_EXT: &str = ".json";

/// Filesystem medium: one `<key>.json` file per key under a data directory.
pub struct FsBackend {
    root: Option<PathBuf>,
    quota_bytes: Option<u64>,
}

impl FsBackend {
    /// `root` of `None` models a platform with no usable data directory;
    /// such a backend fails its write check and the adapter falls back to memory.
    pub fn new(root: Option<PathBuf>) -> Self {
        Self {
            root,
            quota_bytes: None,
        }
    }

    pub fn with_quota(mut self, quota_bytes: Option<u64>) -> Self {
        self.quota_bytes = quota_bytes;
        self
    }

    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    fn root_dir(&self) -> Result<&Path> {
        self.root
            .as_deref()
            .ok_or_else(|| TaskzError::StorageUnavailable("No data directory available".to_string()))
    }

    fn value_path(&self, key: &str) -> Result<PathBuf> {
        if key.is_empty()
            || key.starts_with('.')
            || key.contains(['/', '\\'])
            || key.contains("..")
        {
            return Err(TaskzError::Store(format!("Invalid key: {}", key)));
        }
        Ok(self.root_dir()?.join(format!("{}{}", key, VALUE_EXT)))
    }

    fn ensure_dir(&self, path: &Path) -> Result<()> {
        if !path.exists() {
            fs::create_dir_all(path).map_err(map_io_error)?;
        }
        Ok(())
    }

    fn check_quota(&self, key: &str, incoming: u64) -> Result<()> {
        let Some(quota) = self.quota_bytes else {
            return Ok(());
        };
        let mut others = 0u64;
        for existing in self.keys()? {
            if existing == key {
                continue;
            }
            let path = self.value_path(&existing)?;
            if let Ok(meta) = fs::metadata(path) {
                others += meta.len();
            }
        }
        if others + incoming > quota {
            return Err(TaskzError::QuotaExceeded);
        }
        Ok(())
    }
}

fn map_io_error(err: std::io::Error) -> TaskzError {
    match err.kind() {
        ErrorKind::StorageFull => TaskzError::QuotaExceeded,
        _ => TaskzError::Io(err),
    }
}

impl StorageBackend for FsBackend {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.value_path(key)?;
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(path).map_err(TaskzError::Io)?;
        Ok(Some(content))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let target = self.value_path(key)?;
        let root = self.root_dir()?;
        self.ensure_dir(root)?;
        self.check_quota(key, value.len() as u64)?;

        // Atomic write
        let tmp = root.join(format!(".{}-{}.tmp", key, Uuid::new_v4()));
        if let Err(e) = fs::write(&tmp, value) {
            let _ = fs::remove_file(&tmp);
            return Err(map_io_error(e));
        }
        fs::rename(&tmp, &target).map_err(map_io_error)?;

        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let path = self.value_path(key)?;
        match fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(TaskzError::Io(e)),
        }
    }

    fn keys(&self) -> Result<Vec<String>> {
        let root = self.root_dir()?;
        if !root.exists() {
            return Ok(Vec::new());
        }

        let mut keys = Vec::new();
        for entry in fs::read_dir(root).map_err(TaskzError::Io)? {
            let path = entry.map_err(TaskzError::Io)?.path();
            if !path.is_file() {
                continue;
            }
            let Some(name) = path.file_name().and_then(|s| s.to_str()) else {
                continue;
            };
            if name.starts_with('.') {
                continue;
            }
            if let Some(key) = name.strip_suffix(VALUE_EXT) {
                keys.push(key.to_string());
            }
        }
        keys.sort();
        Ok(keys)
    }

    fn used_bytes(&self) -> Result<u64> {
        let mut total = 0u64;
        for key in self.keys()? {
            if let Ok(meta) = fs::metadata(self.value_path(&key)?) {
                total += meta.len();
            }
        }
        Ok(total)
    }
}
