//! The adapter contract shared by the local and remote stores.
//!
//! Collaborators program against [`DashboardStore`] and never learn which backing store is
//! active, except through [`Capabilities`], which tells them whether a mutation is visible
//! in [`records`](DashboardStore::records) as soon as its future resolves.

use crate::domain::error::Result;
use crate::domain::{Dashboard, DashboardDraft, DashboardPatch, ErrorKind};
use futures_util::future::BoxFuture;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::watch;

/// Immutable record set published to collaborators.
pub type Snapshot = Arc<[Dashboard]>;

/// Lifecycle of an adapter instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// Constructed, nothing read yet.
    Uninitialized,
    /// Waiting for the first read or subscription snapshot.
    Loading,
    /// A record set has been adopted. Errors may coexist with this phase.
    Ready,
    /// Torn down; no further snapshots are published.
    Closed,
}

/// Error flag exposed to collaborators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusError {
    pub kind: ErrorKind,
    pub message: String,
}

/// Behavioural differences between adapters that collaborators may render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    /// Mutations are applied to the published record set before their future resolves.
    ///
    /// When `false`, a settled mutation only shows up once the backing store echoes it
    /// back, so collaborators should render a pending state in between.
    pub optimistic_local_update: bool,
}

/// Create/read/update/delete/export/import contract over one backing store.
///
/// Mutations return boxed futures. The local adapter finishes its work before returning
/// the future; the remote adapter performs its request when the future is polled.
pub trait DashboardStore: Send + Sync {
    /// What [`export_snapshot`](Self::export_snapshot) produces and
    /// [`import_snapshot`](Self::import_snapshot) accepts.
    type Backup;

    fn capabilities(&self) -> Capabilities;

    /// The last published record set.
    fn records(&self) -> Snapshot;

    fn phase(&self) -> Phase;

    fn loading(&self) -> bool {
        self.phase() == Phase::Loading
    }

    /// The most recent failure, if the flag has not been cleared since.
    fn error(&self) -> Option<StatusError>;

    /// Receiver notified on every published snapshot.
    fn subscribe(&self) -> watch::Receiver<Snapshot>;

    /// Creates a record and resolves to its id.
    fn create(&self, draft: DashboardDraft) -> BoxFuture<'_, Result<String>>;

    fn update(&self, id: &str, patch: DashboardPatch) -> BoxFuture<'_, Result<()>>;

    fn delete(&self, id: &str) -> BoxFuture<'_, Result<()>>;

    /// Serializes the current record set.
    ///
    /// # Errors
    ///
    /// Returns an error if the record set cannot be serialized.
    fn export_snapshot(&self) -> Result<Self::Backup>;

    /// Replaces the whole record set with the backup's contents.
    fn import_snapshot(&self, backup: Self::Backup) -> BoxFuture<'_, Result<()>>;
}
