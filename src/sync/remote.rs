//! Remote store adapter.
//!
//! Mirrors a [`RemoteCollection`] into a local snapshot through one standing
//! subscription. Every inbound result set replaces the snapshot wholesale. Mutations are
//! forwarded as single requests and are not applied locally: a settled `create` only
//! appears in [`records`](DashboardStore::records) once the subscription echoes it.
//!
//! # Import Failure Window
//!
//! Import is a destructive replace made of individual requests: every known record is
//! deleted, then every incoming record is created. The backing collection offers no
//! transaction, so a failure partway through leaves a mixed state. The returned
//! [`CatalogError::PartialImport`] reports how far each phase got; nothing is rolled back.

use crate::domain::error::{CatalogError, Result};
use crate::domain::{DashboardDraft, DashboardPatch};
use crate::sync::collection::RemoteCollection;
use crate::sync::status::SyncCell;
use crate::sync::store::{Capabilities, DashboardStore, Phase, Snapshot, StatusError};
use chrono::Utc;
use futures_util::future::BoxFuture;
use futures_util::StreamExt;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::Instrument;

/// Record set mirrored from a remote document collection.
///
/// # Examples
///
/// ```
/// use dashcat::sync::{DashboardStore, MemoryCollection, RemoteAdapter};
/// use std::sync::Arc;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> dashcat::Result<()> {
/// let adapter = RemoteAdapter::new(Arc::new(MemoryCollection::new()));
/// adapter.activate()?;
/// assert!(!adapter.capabilities().optimistic_local_update);
/// # Ok(())
/// # }
/// ```
pub struct RemoteAdapter<C: RemoteCollection> {
    collection: Arc<C>,
    cell: Arc<SyncCell>,
    subscription: Mutex<Option<JoinHandle<()>>>,
}

impl<C: RemoteCollection> std::fmt::Debug for RemoteAdapter<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteAdapter")
            .field("phase", &self.cell.phase())
            .field("records", &self.cell.snapshot().len())
            .finish_non_exhaustive()
    }
}

impl<C: RemoteCollection> RemoteAdapter<C> {
    /// Wraps a collection without subscribing. Call [`activate`](Self::activate) next.
    pub fn new(collection: Arc<C>) -> Self {
        Self {
            collection,
            cell: Arc::new(SyncCell::new()),
            subscription: Mutex::new(None),
        }
    }

    /// Opens the standing subscription on the current tokio runtime.
    ///
    /// Later calls are no-ops. A subscription failure raises the error flag and ends the
    /// loading phase; there is no reconnect.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::RemoteRequestFailed`] when called outside a tokio runtime.
    pub fn activate(&self) -> Result<()> {
        let handle = tokio::runtime::Handle::try_current()
            .map_err(|e| CatalogError::RemoteRequestFailed(format!("no async runtime: {e}")))?;
        if !self.cell.begin_loading() {
            return Ok(());
        }

        let mut documents = self.collection.watch();
        let cell = Arc::clone(&self.cell);
        let span = tracing::debug_span!("remote_subscription");

        let task = handle.spawn(
            async move {
                while let Some(item) = documents.next().await {
                    match item {
                        Ok(batch) => {
                            let stamp = Utc::now();
                            let mut records: Vec<_> =
                                batch.into_iter().map(|d| d.into_dashboard(stamp)).collect();
                            records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
                            if !cell.publish(records) {
                                break;
                            }
                        }
                        Err(e) => {
                            tracing::warn!(error = %e, "subscription ended");
                            cell.record_error(&e);
                            cell.finish_loading();
                            break;
                        }
                    }
                }
            }
            .instrument(span),
        );

        *self
            .subscription
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(task);
        Ok(())
    }

    /// Closes the subscription. No snapshot is published afterwards.
    pub fn close(&self) {
        self.cell.close();
        if let Some(task) = self
            .subscription
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            task.abort();
        }
        tracing::debug!("remote adapter closed");
    }

    /// Records the outcome of one remote request, raising the error flag on failure.
    fn settle<T>(&self, operation: &str, result: Result<T>) -> Result<T> {
        match result {
            Ok(value) => {
                tracing::debug!(operation = operation, "remote request settled");
                Ok(value)
            }
            Err(e) => {
                tracing::debug!(operation = operation, error = %e, "remote request failed");
                self.cell.record_error(&e);
                Err(e)
            }
        }
    }

    /// Validates before anything is sent. Failures raise the flag.
    fn check(&self, result: Result<()>) -> Result<()> {
        if let Err(e) = &result {
            self.cell.record_error(e);
        }
        result
    }

    async fn create_remote(&self, draft: DashboardDraft) -> Result<String> {
        self.cell.clear_error();
        self.check(draft.validate())?;
        let result = self.collection.insert(draft).await;
        self.settle("create", result)
    }

    async fn update_remote(&self, id: String, patch: DashboardPatch) -> Result<()> {
        self.cell.clear_error();
        self.check(patch.validate())?;
        let result = self.collection.patch(&id, patch).await;
        self.settle("update", result)
    }

    async fn delete_remote(&self, id: String) -> Result<()> {
        self.cell.clear_error();
        let result = self.collection.remove(&id).await;
        self.settle("delete", result)
    }

    async fn import_remote(&self, text: String) -> Result<()> {
        self.cell.clear_error();
        let drafts = match parse_import(&text) {
            Ok(drafts) => drafts,
            Err(e) => {
                self.cell.record_error(&e);
                return Err(e);
            }
        };
        let result = self.replace_all(drafts).await;
        self.settle("import", result)
    }

    /// Deletes every known record, then creates every draft, one request at a time.
    async fn replace_all(&self, drafts: Vec<DashboardDraft>) -> Result<()> {
        let known: Vec<String> = self.cell.snapshot().iter().map(|d| d.id.clone()).collect();
        let to_delete = known.len();
        let to_create = drafts.len();
        tracing::debug!(to_delete, to_create, "replacing remote collection");

        let interrupted =
            |deleted: usize, created: usize, source: CatalogError| CatalogError::PartialImport {
                deleted,
                to_delete,
                created,
                to_create,
                source: Box::new(source),
            };

        for (deleted, id) in known.iter().enumerate() {
            if let Err(e) = self.collection.remove(id).await {
                return Err(interrupted(deleted, 0, e));
            }
        }
        for (created, draft) in drafts.into_iter().enumerate() {
            if let Err(e) = self.collection.insert(draft).await {
                return Err(interrupted(to_delete, created, e));
            }
        }
        Ok(())
    }
}

impl<C: RemoteCollection> Drop for RemoteAdapter<C> {
    fn drop(&mut self) {
        if let Some(task) = self
            .subscription
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            task.abort();
        }
    }
}

impl<C: RemoteCollection> DashboardStore for RemoteAdapter<C> {
    type Backup = String;

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            optimistic_local_update: false,
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
        Box::pin(self.create_remote(draft))
    }

    fn update(&self, id: &str, patch: DashboardPatch) -> BoxFuture<'_, Result<()>> {
        Box::pin(self.update_remote(id.to_string(), patch))
    }

    fn delete(&self, id: &str) -> BoxFuture<'_, Result<()>> {
        Box::pin(self.delete_remote(id.to_string()))
    }

    /// Pretty-printed JSON array of the current records.
    fn export_snapshot(&self) -> Result<String> {
        let snapshot = self.cell.snapshot();
        Ok(serde_json::to_string_pretty(&*snapshot)?)
    }

    fn import_snapshot(&self, backup: String) -> BoxFuture<'_, Result<()>> {
        Box::pin(self.import_remote(backup))
    }
}

/// Parses import text into drafts. Nothing is sent unless every element is usable.
fn parse_import(text: &str) -> Result<Vec<DashboardDraft>> {
    let value: serde_json::Value = serde_json::from_str(text)?;
    let serde_json::Value::Array(items) = value else {
        return Err(CatalogError::MalformedData(
            "import payload must be a JSON array of dashboards".to_string(),
        ));
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            let draft: DashboardDraft = serde_json::from_value(item)
                .map_err(|e| CatalogError::MalformedData(format!("entry {index}: {e}")))?;
            draft
                .validate()
                .map_err(|e| CatalogError::MalformedData(format!("entry {index}: {e}")))?;
            Ok(draft)
        })
        .collect()
}
