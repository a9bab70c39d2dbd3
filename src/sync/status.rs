//! Shared status cell for adapters.
//!
//! [`SyncCell`] owns the authoritative snapshot, the lifecycle phase and the error flag,
//! and fans published snapshots out through a `watch` channel. Both adapters keep one;
//! the remote adapter shares it with its subscription task.

use crate::domain::error::CatalogError;
use crate::domain::Dashboard;
use crate::sync::store::{Phase, Snapshot, StatusError};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;

#[derive(Debug)]
struct CellState {
    phase: Phase,
    error: Option<StatusError>,
}

#[derive(Debug)]
pub struct SyncCell {
    state: Mutex<CellState>,
    snapshots: watch::Sender<Snapshot>,
}

impl Default for SyncCell {
    fn default() -> Self {
        Self::new()
    }
}

impl SyncCell {
    #[must_use]
    pub fn new() -> Self {
        let empty: Snapshot = Vec::new().into();
        let (snapshots, _) = watch::channel(empty);
        Self {
            state: Mutex::new(CellState {
                phase: Phase::Uninitialized,
                error: None,
            }),
            snapshots,
        }
    }

    fn lock(&self) -> MutexGuard<'_, CellState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        self.snapshots.borrow().clone()
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.lock().phase
    }

    #[must_use]
    pub fn error(&self) -> Option<StatusError> {
        self.lock().error.clone()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.snapshots.subscribe()
    }

    /// Moves `Uninitialized` to `Loading` and returns `true`. Any other phase is left
    /// alone and yields `false`, so exactly one caller wins the first load.
    pub fn begin_loading(&self) -> bool {
        let mut state = self.lock();
        if state.phase == Phase::Uninitialized {
            state.phase = Phase::Loading;
            true
        } else {
            false
        }
    }

    /// Ends loading without adopting data, e.g. after a failed first read.
    pub fn finish_loading(&self) {
        let mut state = self.lock();
        if state.phase == Phase::Loading {
            state.phase = Phase::Ready;
        }
    }

    /// Adopts `records` as the new authoritative set and notifies subscribers.
    ///
    /// Returns `false` without publishing once the cell is closed.
    pub fn publish(&self, records: Vec<Dashboard>) -> bool {
        let mut state = self.lock();
        if state.phase == Phase::Closed {
            tracing::debug!("ignoring publish after teardown");
            return false;
        }
        state.phase = Phase::Ready;
        let count = records.len();
        self.snapshots.send_replace(records.into());
        drop(state);

        tracing::debug!(record_count = count, "snapshot published");
        true
    }

    /// Raises the error flag. The phase is unaffected.
    pub fn record_error(&self, err: &CatalogError) {
        tracing::warn!(kind = ?err.kind(), error = %err, "sync error recorded");
        self.lock().error = Some(StatusError {
            kind: err.kind(),
            message: err.to_string(),
        });
    }

    pub fn clear_error(&self) {
        self.lock().error = None;
    }

    pub fn close(&self) {
        self.lock().phase = Phase::Closed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DashboardDraft, ErrorKind};

    fn record(id: &str) -> Dashboard {
        Dashboard::from_draft(id, DashboardDraft::new("t", "u"), chrono::Utc::now())
    }

    #[test]
    fn starts_uninitialized_and_empty() {
        let cell = SyncCell::new();
        assert_eq!(cell.phase(), Phase::Uninitialized);
        assert!(cell.snapshot().is_empty());
        assert!(cell.error().is_none());
    }

    #[test]
    fn publish_moves_to_ready_and_notifies() {
        let cell = SyncCell::new();
        let mut rx = cell.subscribe();
        assert!(cell.begin_loading());
        assert!(!cell.begin_loading());
        assert_eq!(cell.phase(), Phase::Loading);

        assert!(cell.publish(vec![record("1")]));

        assert_eq!(cell.phase(), Phase::Ready);
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().len(), 1);
    }

    #[test]
    fn errors_coexist_with_ready() {
        let cell = SyncCell::new();
        cell.publish(vec![]);
        cell.record_error(&CatalogError::RemoteRequestFailed("boom".into()));

        assert_eq!(cell.phase(), Phase::Ready);
        assert_eq!(cell.error().map(|e| e.kind), Some(ErrorKind::RemoteRequestFailed));

        cell.clear_error();
        assert!(cell.error().is_none());
    }

    #[test]
    fn closed_cell_ignores_publishes() {
        let cell = SyncCell::new();
        cell.publish(vec![record("1")]);
        cell.close();

        assert!(!cell.publish(vec![]));
        assert_eq!(cell.snapshot().len(), 1);
        assert_eq!(cell.phase(), Phase::Closed);
    }
}
