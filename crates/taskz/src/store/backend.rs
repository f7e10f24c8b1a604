use crate::error::{Result, TaskzError};

/// Key written and removed to check whether a medium accepts writes.
pub const TEST_KEY: &str = "__storage_test__";

/// Abstract interface for a raw key-value medium.
/// This trait handles the "how" of storage (filesystem vs memory),
/// while TaskStore handles the "what" (envelopes, backups, migration).
pub trait StorageBackend {
    /// Read the value stored under `key`.
    /// Returns Ok(None) if the key does not exist.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value.
    /// MUST be atomic to avoid torn envelopes, and MUST report a full medium
    /// as `TaskzError::QuotaExceeded`.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove `key`. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<()>;

    /// All keys currently stored.
    fn keys(&self) -> Result<Vec<String>>;

    /// Approximate number of bytes held by all values.
    fn used_bytes(&self) -> Result<u64> {
        let mut total = 0u64;
        for key in self.keys()? {
            if let Some(value) = self.get(&key)? {
                total += value.len() as u64;
            }
        }
        Ok(total)
    }

    /// Check the medium by writing and deleting a test key. Never fails.
    ///
    /// A full medium is still reachable: `QuotaExceeded` counts as available
    /// so that stored data stays readable and the save path can clean up.
    fn is_reachable(&self) -> bool {
        match self.set(TEST_KEY, TEST_KEY) {
            Ok(()) => self.remove(TEST_KEY).is_ok(),
            Err(TaskzError::QuotaExceeded) => true,
            Err(_) => false,
        }
    }
}
