//! Directory-backed JSON key-value store.
//!
//! Each key maps to `<dir>/<key>.json`. Writes go to a temporary sibling first and are
//! renamed into place, so a crash never leaves a half-written blob behind.
//!
//! # Performance Characteristics
//!
//! - **Read**: one file read per `get`, no caching
//! - **Write**: O(n) in the blob size, the whole value is rewritten
//! - **Best for**: small catalogs, infrequent writes

use crate::domain::error::{CatalogError, Result};
use crate::storage::backend::KeyValueStore;
use std::path::{Path, PathBuf};

/// JSON file store rooted at a directory.
///
/// # Thread Safety
///
/// This type is `Send` but not `Sync`; the owning adapter serializes access.
#[derive(Debug)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Opens a store rooted at `dir`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use dashcat::storage::FileStore;
    ///
    /// let store = FileStore::new("/tmp/dashcat")?;
    /// # Ok::<(), dashcat::CatalogError>(())
    /// ```
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        tracing::debug!(path = ?dir, "initializing file store");
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Maps a key onto its file. Characters outside `[A-Za-z0-9_-]` become `_`.
    fn path_for(&self, key: &str) -> Result<PathBuf> {
        if key.is_empty() {
            return Err(CatalogError::StorageUnavailable("empty storage key".to_string()));
        }
        let file_name: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        Ok(self.dir.join(format!("{file_name}.json")))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key)?;
        let _span = tracing::debug_span!("file_store_get", path = ?path).entered();

        match std::fs::read_to_string(&path) {
            Ok(contents) => {
                tracing::debug!(bytes = contents.len(), "loaded blob");
                Ok(Some(contents))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("no blob stored");
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key)?;
        let _span = tracing::debug_span!("file_store_set", path = ?path, bytes = value.len()).entered();

        let tmp_path = path.with_extension("json.tmp");

        tracing::trace!(tmp_path = ?tmp_path, "writing to temporary file");
        std::fs::write(&tmp_path, value)?;

        tracing::trace!("renaming temporary file to final location");
        std::fs::rename(&tmp_path, &path)?;

        tracing::debug!("blob saved");
        Ok(())
    }
}
