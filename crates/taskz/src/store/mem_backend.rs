use super::backend::StorageBackend;
use crate::error::{Result, TaskzError};
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;

/// In-memory key-value medium.
///
/// Serves two roles: the non-persistent fallback when the durable medium is
/// unavailable, and a test double that can simulate a full or broken medium.
///
/// Uses `RefCell` for interior mutability since taskz is single-threaded.
/// This avoids the overhead of `RwLock` while still allowing the
/// `StorageBackend` trait to use `&self` for all methods.
#[derive(Default)]
pub struct MemBackend {
    entries: RefCell<BTreeMap<String, String>>,
    quota_bytes: Cell<Option<u64>>,
    simulate_write_error: Cell<bool>,
    simulate_unavailable: Cell<bool>,
}

impl MemBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject writes that would push total usage past `bytes`.
    pub fn with_quota(self, bytes: u64) -> Self {
        self.quota_bytes.set(Some(bytes));
        self
    }

    /// Enable write error simulation for testing error handling.
    pub fn set_simulate_write_error(&self, simulate: bool) {
        self.simulate_write_error.set(simulate);
    }

    /// Make every operation fail, as a disabled or inaccessible medium would.
    pub fn set_simulate_unavailable(&self, simulate: bool) {
        self.simulate_unavailable.set(simulate);
    }

    pub fn set_quota(&self, bytes: Option<u64>) {
        self.quota_bytes.set(bytes);
    }

    /// Test helper to plant a raw value, bypassing quota and error simulation.
    pub fn insert_raw(&self, key: &str, value: &str) {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    fn check_available(&self) -> Result<()> {
        if self.simulate_unavailable.get() {
            return Err(TaskzError::StorageUnavailable(
                "Simulated unavailable medium".to_string(),
            ));
        }
        Ok(())
    }
}

impl StorageBackend for MemBackend {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.check_available()?;
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.check_available()?;
        if self.simulate_write_error.get() {
            return Err(TaskzError::Store("Simulated write error".to_string()));
        }

        let mut entries = self.entries.borrow_mut();
        if let Some(quota) = self.quota_bytes.get() {
            let others: u64 = entries
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(_, v)| v.len() as u64)
                .sum();
            if others + value.len() as u64 > quota {
                return Err(TaskzError::QuotaExceeded);
            }
        }
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.check_available()?;
        self.entries.borrow_mut().remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>> {
        self.check_available()?;
        Ok(self.entries.borrow().keys().cloned().collect())
    }
}
