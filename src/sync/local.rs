//! Local store adapter.
//!
//! Keeps the record set in memory and persists all of it on every mutation as JSON blobs
//! in a [`KeyValueStore`]. Two keys are written in lockstep:
//!
//! - `dashboard-manager-data`: `{ "dashboards": [...] }`, the primary blob
//! - `dashboards`: the bare array, kept for stores written by older versions
//!
//! On load the primary key wins. A store holding only the legacy key is adopted and both
//! keys are rewritten. An empty store is seeded with the default dataset.
//!
//! # Corrupt Data Policy
//!
//! If the persisted blob does not parse or violates record invariants, the adapter raises
//! a `MalformedData` flag and adopts the seed dataset in memory. The corrupt blob is left
//! on disk until the next successful mutation overwrites it.
//!
//! # Failure Model
//!
//! Create, update and delete persist first and publish second, so a rejected write leaves
//! the published set at its last-known-good state. Import publishes first and persists
//! second; a rejected write there raises the flag without rolling the import back.

use crate::domain::error::{CatalogError, Result};
use crate::domain::{
    validate_record_set, BackupDocument, Dashboard, DashboardDraft, DashboardPatch,
};
use crate::infrastructure::paths::backup_file_name;
use crate::storage::{seed_dashboards, KeyValueStore};
use crate::sync::status::SyncCell;
use crate::sync::store::{Capabilities, DashboardStore, Phase, Snapshot, StatusError};
use chrono::{DateTime, Utc};
use futures_util::future::BoxFuture;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;

/// Key of the primary `{ dashboards: [...] }` blob.
pub const STORAGE_KEY: &str = "dashboard-manager-data";

/// Key of the legacy bare-array blob.
pub const LEGACY_KEY: &str = "dashboards";

#[derive(Debug, Serialize, Deserialize)]
struct PersistedBlob {
    dashboards: Vec<Dashboard>,
}

/// Where [`LocalAdapter::initialize`] found its records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoadSource {
    Primary,
    Legacy,
}

/// Record set persisted as whole-set blobs in a synchronous key-value store.
///
/// # Examples
///
/// ```
/// use dashcat::storage::MemoryStore;
/// use dashcat::sync::{DashboardStore, LocalAdapter};
///
/// let adapter = LocalAdapter::open(MemoryStore::new());
/// assert_eq!(adapter.records().len(), 6);
/// ```
pub struct LocalAdapter {
    store: Mutex<Box<dyn KeyValueStore>>,
    cell: SyncCell,
}

impl std::fmt::Debug for LocalAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalAdapter")
            .field("phase", &self.cell.phase())
            .field("records", &self.cell.snapshot().len())
            .finish_non_exhaustive()
    }
}

impl LocalAdapter {
    /// Wraps a store without reading it. The first operation triggers
    /// [`initialize`](Self::initialize).
    pub fn new(store: impl KeyValueStore + 'static) -> Self {
        Self {
            store: Mutex::new(Box::new(store)),
            cell: SyncCell::new(),
        }
    }

    /// Wraps a store and loads it immediately.
    pub fn open(store: impl KeyValueStore + 'static) -> Self {
        let adapter = Self::new(store);
        adapter.initialize();
        adapter
    }

    fn lock_store(&self) -> MutexGuard<'_, Box<dyn KeyValueStore>> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Loads the persisted record set, seeding the store on first run.
    ///
    /// Runs once per adapter; later calls return immediately. Never fails: problems are
    /// reported through [`error`](DashboardStore::error).
    pub fn initialize(&self) {
        let mut store = self.lock_store();
        self.load(&mut **store);
    }

    /// Runs the first load while the caller holds the store guard, so no mutation can
    /// observe the loading phase before the persisted set is published.
    fn load(&self, store: &mut dyn KeyValueStore) {
        if !self.cell.begin_loading() {
            return;
        }

        let _span = tracing::debug_span!("local_initialize").entered();

        match read_persisted(store) {
            Ok(Some((records, source))) => {
                tracing::debug!(record_count = records.len(), source = ?source, "loaded persisted dashboards");
                if source == LoadSource::Legacy {
                    tracing::debug!("adopting legacy blob, rewriting both keys");
                    if let Err(e) = write_blob(store, &records) {
                        self.cell.record_error(&e);
                    }
                }
                self.cell.publish(records);
            }
            Ok(None) => {
                let seed = seed_dashboards();
                tracing::debug!(record_count = seed.len(), "empty store, writing seed dataset");
                if let Err(e) = write_blob(store, &seed) {
                    self.cell.record_error(&e);
                }
                self.cell.publish(seed);
            }
            Err(e @ CatalogError::MalformedData(_)) => {
                tracing::warn!(error = %e, "persisted dashboards are corrupt, falling back to seed data");
                self.cell.record_error(&e);
                self.cell.publish(seed_dashboards());
            }
            Err(e) => {
                self.cell.record_error(&e);
                self.cell.finish_loading();
            }
        }
    }

    /// Tears the adapter down. Later mutations still persist but publish nothing.
    pub fn close(&self) {
        self.cell.close();
    }

    fn create_now(&self, draft: DashboardDraft) -> Result<String> {
        let mut store = self.lock_store();
        self.load(&mut **store);
        let _span = tracing::debug_span!("local_create", title = %draft.title).entered();
        self.cell.clear_error();

        if let Err(e) = draft.validate() {
            self.cell.record_error(&e);
            return Err(e);
        }

        let mut records = self.cell.snapshot().to_vec();
        let now = Utc::now();
        let id = next_id(&records, now);
        records.push(Dashboard::from_draft(id.clone(), draft, now));

        self.commit(&mut **store, records)?;
        tracing::debug!(id = %id, "dashboard created");
        Ok(id)
    }

    fn update_now(&self, id: &str, patch: DashboardPatch) -> Result<()> {
        let mut store = self.lock_store();
        self.load(&mut **store);
        let _span = tracing::debug_span!("local_update", id = %id).entered();
        self.cell.clear_error();

        if let Err(e) = patch.validate() {
            self.cell.record_error(&e);
            return Err(e);
        }

        let mut records = self.cell.snapshot().to_vec();
        let Some(record) = records.iter_mut().find(|d| d.id == id) else {
            tracing::debug!("dashboard not found, update is a no-op");
            return Ok(());
        };
        record.apply(patch, Utc::now());

        self.commit(&mut **store, records)
    }

    fn delete_now(&self, id: &str) -> Result<()> {
        let mut store = self.lock_store();
        self.load(&mut **store);
        let _span = tracing::debug_span!("local_delete", id = %id).entered();
        self.cell.clear_error();

        let mut records = self.cell.snapshot().to_vec();
        let before = records.len();
        records.retain(|d| d.id != id);
        if records.len() == before {
            tracing::debug!("dashboard not found, delete is a no-op");
            return Ok(());
        }

        self.commit(&mut **store, records)
    }

    fn import_now(&self, document: BackupDocument) -> Result<()> {
        let mut store = self.lock_store();
        self.load(&mut **store);
        let _span = tracing::debug_span!("local_import", record_count = document.dashboards.len()).entered();
        self.cell.clear_error();

        if let Err(e) = document.validate() {
            self.cell.record_error(&e);
            return Err(e);
        }

        let records = document.dashboards;
        self.cell.publish(records.clone());

        if let Err(e) = write_blob(&mut **store, &records) {
            self.cell.record_error(&e);
            return Err(e);
        }
        tracing::debug!("backup imported");
        Ok(())
    }

    /// Persists `records`, then publishes them. On a rejected write the published set is
    /// left untouched.
    fn commit(&self, store: &mut dyn KeyValueStore, records: Vec<Dashboard>) -> Result<()> {
        if let Err(e) = write_blob(store, &records) {
            self.cell.record_error(&e);
            return Err(e);
        }
        self.cell.publish(records);
        Ok(())
    }

    /// Writes the current export as an indented JSON file into `dir`.
    ///
    /// The file is named `dashboard-backup-<timestamp>.json`; `dir` is created if needed.
    ///
    /// # Errors
    ///
    /// Returns an error, and raises the error flag, if the file cannot be written.
    pub fn download_backup(&self, dir: &Path) -> Result<PathBuf> {
        let _span = tracing::debug_span!("local_download_backup", dir = ?dir).entered();

        let result = (|| -> Result<PathBuf> {
            let document = self.export_snapshot()?;
            let json = document.to_pretty_json()?;
            std::fs::create_dir_all(dir)?;
            let path = dir.join(backup_file_name(document.last_updated));
            std::fs::write(&path, json)?;
            Ok(path)
        })();

        match result {
            Ok(path) => {
                tracing::debug!(path = ?path, "backup written");
                Ok(path)
            }
            Err(e) => {
                self.cell.record_error(&e);
                Err(e)
            }
        }
    }
}

impl DashboardStore for LocalAdapter {
    type Backup = BackupDocument;

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            optimistic_local_update: true,
        }
    }

    fn records(&self) -> Snapshot {
        self.cell.snapshot()
    }

    fn phase(&self) -> Phase {
        self.cell.phase()
    }

    fn error(&self) -> Option<StatusError> {
        self.cell.error()
    }

    fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.cell.subscribe()
    }

    fn create(&self, draft: DashboardDraft) -> BoxFuture<'_, Result<String>> {
        Box::pin(std::future::ready(self.create_now(draft)))
    }

    fn update(&self, id: &str, patch: DashboardPatch) -> BoxFuture<'_, Result<()>> {
        Box::pin(std::future::ready(self.update_now(id, patch)))
    }

    fn delete(&self, id: &str) -> BoxFuture<'_, Result<()>> {
        Box::pin(std::future::ready(self.delete_now(id)))
    }

    fn export_snapshot(&self) -> Result<BackupDocument> {
        self.initialize();
        Ok(BackupDocument::new(self.cell.snapshot().to_vec(), Utc::now()))
    }

    fn import_snapshot(&self, backup: BackupDocument) -> BoxFuture<'_, Result<()>> {
        Box::pin(std::future::ready(self.import_now(backup)))
    }
}

/// Reads and validates the persisted record set.
///
/// Returns `Ok(None)` when neither key holds a blob.
fn read_persisted(store: &dyn KeyValueStore) -> Result<Option<(Vec<Dashboard>, LoadSource)>> {
    if let Some(text) = store.get(STORAGE_KEY)? {
        let blob: PersistedBlob = serde_json::from_str(&text)
            .map_err(|e| CatalogError::MalformedData(format!("{STORAGE_KEY}: {e}")))?;
        validate_record_set(&blob.dashboards)?;
        return Ok(Some((blob.dashboards, LoadSource::Primary)));
    }

    if let Some(text) = store.get(LEGACY_KEY)? {
        let records: Vec<Dashboard> = serde_json::from_str(&text)
            .map_err(|e| CatalogError::MalformedData(format!("{LEGACY_KEY}: {e}")))?;
        validate_record_set(&records)?;
        return Ok(Some((records, LoadSource::Legacy)));
    }

    Ok(None)
}

/// Writes the record set under both keys.
fn write_blob(store: &mut dyn KeyValueStore, records: &[Dashboard]) -> Result<()> {
    let primary = serde_json::to_string(&serde_json::json!({ "dashboards": records }))?;
    let legacy = serde_json::to_string(records)?;
    store.set(STORAGE_KEY, &primary)?;
    store.set(LEGACY_KEY, &legacy)?;
    Ok(())
}

/// Millisecond timestamp of `now`, bumped until it collides with no existing id.
fn next_id(records: &[Dashboard], now: DateTime<Utc>) -> String {
    let mut millis = now.timestamp_millis();
    loop {
        let candidate = millis.to_string();
        if !records.iter().any(|d| d.id == candidate) {
            return candidate;
        }
        millis += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn next_id_skips_taken_timestamps() {
        let now = Utc.timestamp_millis_opt(1_000).single().unwrap();
        let taken: Vec<Dashboard> = ["1000", "1001"]
            .iter()
            .map(|id| Dashboard::from_draft(*id, DashboardDraft::new("t", "u"), now))
            .collect();

        assert_eq!(next_id(&taken, now), "1002");
        assert_eq!(next_id(&[], now), "1000");
    }

    #[test]
    fn write_blob_keeps_both_keys_in_sync() {
        let store = crate::storage::MemoryStore::new();
        let mut handle = store.clone();
        write_blob(&mut handle, &seed_dashboards()).unwrap();

        let primary: PersistedBlob = serde_json::from_str(&store.peek(STORAGE_KEY).unwrap()).unwrap();
        let legacy: Vec<Dashboard> = serde_json::from_str(&store.peek(LEGACY_KEY).unwrap()).unwrap();
        assert_eq!(primary.dashboards, legacy);
    }

    #[test]
    fn initialize_runs_once() {
        let store = crate::storage::MemoryStore::new();
        let adapter = LocalAdapter::open(store.clone());
        store.poke(STORAGE_KEY, "not json");

        adapter.initialize();

        assert!(adapter.error().is_none());
        assert_eq!(adapter.records().len(), 6);
    }
}
