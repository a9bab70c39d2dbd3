//! Key-value store abstraction.
//!
//! The local adapter persists its whole record set as serialized blobs under a couple of
//! well-known keys. [`KeyValueStore`] is the minimal synchronous surface it needs, so the
//! adapter works the same against a directory of JSON files or an in-memory map.

use crate::domain::error::Result;

/// Synchronous string key-value store.
///
/// # Implementations
///
/// - [`FileStore`](crate::storage::FileStore): one JSON file per key with atomic writes
/// - [`MemoryStore`](crate::storage::MemoryStore): shared in-memory map with failure switches
///
/// # Examples
///
/// ```
/// use dashcat::storage::{KeyValueStore, MemoryStore};
///
/// let mut store = MemoryStore::new();
/// store.set("greeting", "hello")?;
/// assert_eq!(store.get("greeting")?.as_deref(), Some("hello"));
/// # Ok::<(), dashcat::CatalogError>(())
/// ```
pub trait KeyValueStore: Send {
    /// Reads the value under `key`. Returns `Ok(None)` if the key was never written.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Writes `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the write is rejected.
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}
