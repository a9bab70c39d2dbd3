//! Error types for the dashboard catalog.
//!
//! [`CatalogError`] is the single error type returned by every fallible operation in the
//! crate. Each variant maps onto one of the four failure kinds in [`ErrorKind`], which is
//! what adapters expose through their status flag so collaborators can render a message
//! without matching on the full error.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Coarse failure taxonomy surfaced through adapter status flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Persistent store inaccessible or a write was rejected.
    StorageUnavailable,
    /// Stored or imported JSON failed to parse or failed shape validation.
    MalformedData,
    /// A request against the remote collection was rejected.
    RemoteRequestFailed,
    /// A required field was missing or empty before a mutation was attempted.
    ValidationFailed,
}

/// The main error type for catalog operations.
///
/// # Examples
///
/// ```
/// use dashcat::domain::{CatalogError, ErrorKind};
///
/// let err = CatalogError::ValidationFailed("title is required".to_string());
/// assert_eq!(err.kind(), ErrorKind::ValidationFailed);
/// ```
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The key-value store could not be read or written.
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    /// Persisted or imported data could not be parsed or violates record invariants.
    #[error("Malformed data: {0}")]
    MalformedData(String),

    /// The remote collection rejected a request or the subscription failed.
    #[error("Remote request failed: {0}")]
    RemoteRequestFailed(String),

    /// A draft or patch is missing a required field.
    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    /// A destructive remote import stopped partway through.
    ///
    /// The counters record how far the delete and create phases got before `source`
    /// failed. Records already deleted are not restored.
    #[error(
        "Import interrupted after deleting {deleted}/{to_delete} and creating {created}/{to_create} dashboards: {source}"
    )]
    PartialImport {
        deleted: usize,
        to_delete: usize,
        created: usize,
        to_create: usize,
        #[source]
        source: Box<CatalogError>,
    },

    /// Filesystem operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration is invalid or could not be read.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl CatalogError {
    /// Classifies the error into the status-flag taxonomy.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::StorageUnavailable(_) | Self::Io(_) => ErrorKind::StorageUnavailable,
            Self::MalformedData(_) | Self::Config(_) => ErrorKind::MalformedData,
            Self::RemoteRequestFailed(_) => ErrorKind::RemoteRequestFailed,
            Self::ValidationFailed(_) => ErrorKind::ValidationFailed,
            Self::PartialImport { source, .. } => source.kind(),
        }
    }
}

impl From<serde_json::Error> for CatalogError {
    fn from(err: serde_json::Error) -> Self {
        Self::MalformedData(err.to_string())
    }
}

/// A specialized `Result` type for catalog operations.
pub type Result<T> = std::result::Result<T, CatalogError>;
