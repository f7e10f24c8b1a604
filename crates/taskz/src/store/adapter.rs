use super::backend::StorageBackend;
use super::mem_backend::MemBackend;
use crate::error::Result;
use tracing::{debug, warn};

enum Medium<B> {
    Durable(B),
    Memory(MemBackend),
}

/// Capability-checked wrapper over a [`StorageBackend`].
///
/// The medium is checked once at construction. If it does not accept writes,
/// the adapter switches to a process-local [`MemBackend`] for the rest of its
/// life and every later operation runs against that map instead.
pub struct DurableStore<B: StorageBackend> {
    medium: Medium<B>,
}

impl<B: StorageBackend> DurableStore<B> {
    pub fn open(backend: B) -> Self {
        if backend.is_reachable() {
            Self {
                medium: Medium::Durable(backend),
            }
        } else {
            warn!(target: "taskz::store", "Storage medium unavailable, using in-memory storage");
            Self {
                medium: Medium::Memory(MemBackend::new()),
            }
        }
    }

    fn backend(&self) -> &dyn StorageBackend {
        match &self.medium {
            Medium::Durable(b) => b,
            Medium::Memory(m) => m,
        }
    }

    /// True when data lives only in this process.
    pub fn is_memory_mode(&self) -> bool {
        matches!(self.medium, Medium::Memory(_))
    }

    /// Probe the active medium again. Never fails.
    pub fn is_available(&self) -> bool {
        self.backend().is_reachable()
    }

    /// The durable backend, unless the adapter fell back to memory.
    pub fn durable(&self) -> Option<&B> {
        match &self.medium {
            Medium::Durable(b) => Some(b),
            Medium::Memory(_) => None,
        }
    }

    /// Fails soft: a read error is reported as a missing key.
    pub fn read(&self, key: &str) -> Option<String> {
        match self.backend().get(key) {
            Ok(value) => value,
            Err(e) => {
                debug!(target: "taskz::store", key, error = %e, "Read failed");
                None
            }
        }
    }

    pub fn write(&self, key: &str, value: &str) -> Result<()> {
        self.backend().set(key, value)
    }

    pub fn remove(&self, key: &str) -> Result<()> {
        self.backend().remove(key)
    }

    pub fn list_keys(&self) -> Vec<String> {
        self.backend().keys().unwrap_or_else(|e| {
            debug!(target: "taskz::store", error = %e, "Listing keys failed");
            Vec::new()
        })
    }

    pub fn used_bytes(&self) -> u64 {
        self.backend().used_bytes().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TaskzError;

    #[test]
    fn available_medium_is_used_directly() {
        let store = DurableStore::open(MemBackend::new());
        assert!(!store.is_memory_mode());
        assert!(store.is_available());

        store.write("k", "v").unwrap();
        assert_eq!(store.durable().unwrap().get("k").unwrap(), Some("v".into()));
    }

    #[test]
    fn unavailable_medium_falls_back_to_memory() {
        let backend = MemBackend::new();
        backend.set_simulate_unavailable(true);

        let store = DurableStore::open(backend);
        assert!(store.is_memory_mode());
        assert!(store.durable().is_none());

        // Operations succeed against the fallback map
        store.write("k", "v").unwrap();
        assert_eq!(store.read("k"), Some("v".to_string()));
        assert_eq!(store.list_keys(), vec!["k"]);
        store.remove("k").unwrap();
        assert_eq!(store.read("k"), None);
    }

    #[test]
    fn read_fails_soft() {
        let store = DurableStore::open(MemBackend::new());
        store.durable().unwrap().set_simulate_unavailable(true);

        assert_eq!(store.read("anything"), None);
        assert!(store.list_keys().is_empty());
        assert!(!store.is_available());
    }

    #[test]
    fn quota_is_reported_distinctly() {
        let store = DurableStore::open(MemBackend::new().with_quota(4));
        assert!(!store.is_memory_mode());
        let err = store.write("k", "too long").unwrap_err();
        assert!(matches!(err, TaskzError::QuotaExceeded));
    }
}
