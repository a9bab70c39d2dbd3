//! Dashcat: a catalog of links to research-funding dashboards.
//!
//! The crate is built around a data-synchronization layer that keeps an in-memory record
//! set consistent with a backing store, and exposes the same contract over two stores:
//! - a local key-value store holding the whole set as JSON blobs
//! - a remote document collection mirrored through a live subscription
//!
//! Presentation concerns (search, category filter, PIN gate, share links) sit on top as
//! plain collaborators that consume published snapshots.

#![allow(clippy::multiple_crate_versions)]

//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │  CLI (main.rs)                                      │  ← Entry point
//! └─────────────────────────────────────────────────────┘
//!                        │
//! ┌─────────────────────────────────────────────────────┐
//! │  Presentation Collaborators (app/)                  │
//! │  - Catalog view: search, category, cursor           │
//! │  - Manager PIN gate                                 │
//! │  - Share panel                                      │
//! └─────────────────────────────────────────────────────┘
//!                        │ snapshots
//! ┌─────────────────────────────────────────────────────┐
//! │  Sync Layer (sync/)                                 │  ← DashboardStore
//! │  - LocalAdapter: optimistic, whole-set blobs        │
//! │  - RemoteAdapter: subscription-driven               │
//! └─────────────────────────────────────────────────────┘
//!         │                                      │
//! ┌───────────────────────────┐   ┌───────────────────────────┐
//! │ Storage Layer (storage/)  │   │ Remote Collection         │
//! │ - KeyValueStore trait     │   │ (sync/collection)         │
//! │ - JSON files, memory      │   │ - MemoryCollection        │
//! │ - Seed dataset            │   │                           │
//! └───────────────────────────┘   └───────────────────────────┘
//!                        │
//! ┌─────────────────────────────────────────────────────┐
//! │  Infrastructure & Domain Layers                     │
//! │  - Platform paths (infrastructure/)                 │
//! │  - Record model, backup document (domain/)          │
//! │  - Error taxonomy (domain/error)                    │
//! └─────────────────────────────────────────────────────┘
//!                        │
//! ┌─────────────────────────────────────────────────────┐
//! │  Observability (observability/)                     │  ← Optional
//! │  - OpenTelemetry tracing                            │
//! │  - JSON-lines span export                           │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! # Configuration
//!
//! ```toml
//! # dashcat.toml
//! data_dir = "~/.local/share/dashcat"
//! backup_dir = "~/Downloads"
//! manager_pin = "2024"
//! trace_level = "debug"
//! ```
//!
//! # Example
//!
//! ```rust
//! use dashcat::storage::MemoryStore;
//! use dashcat::sync::{DashboardStore, LocalAdapter};
//! use dashcat::domain::DashboardDraft;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> dashcat::Result<()> {
//! let adapter = LocalAdapter::open(MemoryStore::new());
//! let id = adapter.create(DashboardDraft::new("A", "https://a.test")).await?;
//! assert!(adapter.records().iter().any(|d| d.id == id));
//! # Ok(())
//! # }
//! ```

pub mod app;
pub mod domain;
pub mod infrastructure;
pub mod observability;
pub mod storage;
pub mod sync;

pub use app::{CatalogView, ManagerGate, SharePanel, ShareTarget};
pub use domain::{BackupDocument, CatalogError, Dashboard, DashboardDraft, DashboardPatch, Result};
pub use sync::{DashboardStore, LocalAdapter, RemoteAdapter};

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// PIN of the manager gate when none is configured.
pub const DEFAULT_MANAGER_PIN: &str = "2024";

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Directory of the JSON key-value store and the span log.
    pub data_dir: PathBuf,

    /// Where downloaded backups are written by default.
    pub backup_dir: PathBuf,

    /// PIN that unlocks the manager gate. Cosmetic only.
    pub manager_pin: String,

    /// Tracing filter directive, e.g. `info` or `dashcat=debug`. `RUST_LOG` takes
    /// precedence.
    pub trace_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: infrastructure::get_data_dir(),
            backup_dir: PathBuf::from("."),
            manager_pin: DEFAULT_MANAGER_PIN.to_string(),
            trace_level: "info".to_string(),
        }
    }
}

/// On-disk shape of the configuration file. Every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    data_dir: Option<String>,
    backup_dir: Option<String>,
    manager_pin: Option<String>,
    trace_level: Option<String>,
}

impl Config {
    /// Builds a configuration from string pairs, falling back to defaults per key.
    ///
    /// Recognized keys: `data_dir`, `backup_dir`, `manager_pin`, `trace_level`. Paths
    /// starting with `~` are expanded; blank values are ignored.
    ///
    /// # Example
    ///
    /// ```rust
    /// use std::collections::BTreeMap;
    /// use dashcat::Config;
    ///
    /// let mut map = BTreeMap::new();
    /// map.insert("manager_pin".to_string(), "9876".to_string());
    ///
    /// let config = Config::from_map(&map);
    /// assert_eq!(config.manager_pin, "9876");
    /// assert_eq!(config.trace_level, "info");
    /// ```
    #[must_use]
    pub fn from_map(map: &BTreeMap<String, String>) -> Self {
        let get = |key: &str| {
            map.get(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        Self::default().merged(ConfigFile {
            data_dir: get("data_dir"),
            backup_dir: get("backup_dir"),
            manager_pin: get("manager_pin"),
            trace_level: get("trace_level"),
        })
    }

    /// Reads a TOML configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Io`] if the file cannot be read and [`CatalogError::Config`]
    /// if it is not valid TOML or contains unknown keys.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let file: ConfigFile = toml::from_str(&contents)
            .map_err(|e| CatalogError::Config(format!("{}: {e}", path.display())))?;
        Ok(Self::default().merged(file))
    }

    fn merged(mut self, file: ConfigFile) -> Self {
        if let Some(dir) = file.data_dir.filter(|v| !v.trim().is_empty()) {
            self.data_dir = infrastructure::expand_tilde(dir.trim());
        }
        if let Some(dir) = file.backup_dir.filter(|v| !v.trim().is_empty()) {
            self.backup_dir = infrastructure::expand_tilde(dir.trim());
        }
        if let Some(pin) = file.manager_pin.filter(|v| !v.is_empty()) {
            self.manager_pin = pin;
        }
        if let Some(level) = file.trace_level.filter(|v| !v.trim().is_empty()) {
            self.trace_level = level;
        }
        self
    }
}

/// Opens the local adapter over the JSON file store in `config.data_dir`.
///
/// # Errors
///
/// Returns an error if the data directory cannot be created.
pub fn open_local_catalog(config: &Config) -> Result<LocalAdapter> {
    tracing::debug!(data_dir = ?config.data_dir, "opening local catalog");
    let store = storage::FileStore::new(&config.data_dir)?;
    Ok(LocalAdapter::open(store))
}
