//! In-memory key-value store.
//!
//! Clones share the same map, which lets a test hand one handle to an adapter and keep
//! another to inspect or corrupt what was persisted. Two switches simulate a store that
//! cannot be reached at all or that rejects writes.

use crate::domain::error::{CatalogError, Result};
use crate::storage::backend::KeyValueStore;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Debug, Default)]
struct MemoryInner {
    entries: HashMap<String, String>,
    unavailable: bool,
    read_only: bool,
}

/// Shared in-memory store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<MemoryInner>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// When set, every read and write fails with `StorageUnavailable`.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.lock().unavailable = unavailable;
    }

    /// When set, reads succeed but writes fail with `StorageUnavailable`.
    pub fn set_read_only(&self, read_only: bool) {
        self.lock().read_only = read_only;
    }

    /// Reads a key directly, bypassing the failure switches.
    #[must_use]
    pub fn peek(&self, key: &str) -> Option<String> {
        self.lock().entries.get(key).cloned()
    }

    /// Writes a key directly, bypassing the failure switches.
    pub fn poke(&self, key: &str, value: &str) {
        self.lock().entries.insert(key.to_string(), value.to_string());
    }

    fn lock(&self) -> MutexGuard<'_, MemoryInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let inner = self.lock();
        if inner.unavailable {
            return Err(CatalogError::StorageUnavailable("store is unavailable".to_string()));
        }
        Ok(inner.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let mut inner = self.lock();
        if inner.unavailable || inner.read_only {
            return Err(CatalogError::StorageUnavailable(format!("write to {key} rejected")));
        }
        inner.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorKind;

    #[test]
    fn clones_share_entries() {
        let store = MemoryStore::new();
        let mut handle = store.clone();
        handle.set("k", "v").unwrap();
        assert_eq!(store.peek("k").as_deref(), Some("v"));
    }

    #[test]
    fn read_only_rejects_writes_but_allows_reads() {
        let mut store = MemoryStore::new();
        store.poke("k", "v");
        store.set_read_only(true);

        assert_eq!(store.get("k").unwrap().as_deref(), Some("v"));
        let err = store.set("k", "w").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::StorageUnavailable);
    }

    #[test]
    fn unavailable_rejects_reads() {
        let store = MemoryStore::new();
        store.set_unavailable(true);
        assert!(store.get("k").is_err());
    }
}
