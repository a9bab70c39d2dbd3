//! In-process [`RemoteCollection`] with server semantics.
//!
//! Generates document keys, stamps server timestamps from a strictly increasing clock,
//! and broadcasts the full ordered result set to every watcher after each change. Each
//! request yields to the scheduler once before it is applied, the way a network round
//! trip would. Failure switches let tests reject individual requests or break the
//! standing query.

use crate::domain::error::{CatalogError, Result};
use crate::domain::{normalize_category, DashboardDraft, DashboardPatch};
use crate::sync::collection::{DocumentFields, DocumentStream, RemoteCollection, RemoteDocument};
use chrono::{DateTime, Duration, Utc};
use futures_util::future::BoxFuture;
use futures_util::stream::{self, StreamExt};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;

/// Requests that can be made to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteOp {
    Insert,
    Patch,
    Remove,
}

/// What watchers observe.
#[derive(Debug, Clone)]
enum Feed {
    Documents(Arc<Vec<RemoteDocument>>),
    Broken(String),
}

#[derive(Debug, Default)]
struct Budgets {
    insert: Option<usize>,
    patch: Option<usize>,
    remove: Option<usize>,
}

impl Budgets {
    fn slot(&mut self, op: RemoteOp) -> &mut Option<usize> {
        match op {
            RemoteOp::Insert => &mut self.insert,
            RemoteOp::Patch => &mut self.patch,
            RemoteOp::Remove => &mut self.remove,
        }
    }

    /// Consumes one success from the budget. `false` means the request must fail.
    fn admit(&mut self, op: RemoteOp) -> bool {
        match self.slot(op) {
            None => true,
            Some(0) => false,
            Some(remaining) => {
                *remaining -= 1;
                true
            }
        }
    }
}

#[derive(Debug)]
struct CollectionState {
    documents: Vec<RemoteDocument>,
    last_stamp: Option<DateTime<Utc>>,
    budgets: Budgets,
}

/// In-memory remote collection.
///
/// # Examples
///
/// ```
/// use dashcat::sync::{MemoryCollection, RemoteOp};
///
/// let collection = MemoryCollection::new();
/// collection.fail_after(RemoteOp::Insert, 2);
/// assert!(collection.is_empty());
/// ```
#[derive(Debug)]
pub struct MemoryCollection {
    state: Mutex<CollectionState>,
    feed: watch::Sender<Feed>,
}

impl Default for MemoryCollection {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryCollection {
    #[must_use]
    pub fn new() -> Self {
        let (feed, _) = watch::channel(Feed::Documents(Arc::new(Vec::new())));
        Self {
            state: Mutex::new(CollectionState {
                documents: Vec::new(),
                last_stamp: None,
                budgets: Budgets::default(),
            }),
            feed,
        }
    }

    fn lock(&self) -> MutexGuard<'_, CollectionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Lets `successes` more requests of kind `op` through, then rejects the rest.
    pub fn fail_after(&self, op: RemoteOp, successes: usize) {
        *self.lock().budgets.slot(op) = Some(successes);
    }

    /// Removes any failure budget for `op`.
    pub fn heal(&self, op: RemoteOp) {
        *self.lock().budgets.slot(op) = None;
    }

    /// Fails every open and future watcher until the next successful change.
    pub fn break_subscription(&self, reason: impl Into<String>) {
        self.feed.send_replace(Feed::Broken(reason.into()));
    }

    /// Current documents, newest first.
    #[must_use]
    pub fn documents(&self) -> Vec<RemoteDocument> {
        self.lock().documents.clone()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().documents.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Next server timestamp, strictly after the previous one.
    fn stamp(state: &mut CollectionState) -> DateTime<Utc> {
        let now = Utc::now();
        let stamp = match state.last_stamp {
            Some(last) if now <= last => last + Duration::microseconds(1),
            _ => now,
        };
        state.last_stamp = Some(stamp);
        stamp
    }

    /// Re-sorts newest first and pushes the result set to watchers.
    fn broadcast(&self, state: &mut CollectionState) {
        state
            .documents
            .sort_by(|a, b| b.fields.created_at.cmp(&a.fields.created_at));
        self.feed
            .send_replace(Feed::Documents(Arc::new(state.documents.clone())));
    }

    fn admit(state: &mut CollectionState, op: RemoteOp) -> Result<()> {
        if state.budgets.admit(op) {
            Ok(())
        } else {
            Err(CatalogError::RemoteRequestFailed(format!("{op:?} rejected by server")))
        }
    }

    fn apply_insert(&self, draft: DashboardDraft) -> Result<String> {
        let mut state = self.lock();
        Self::admit(&mut state, RemoteOp::Insert)?;

        let id = uuid::Uuid::new_v4().simple().to_string();
        let stamp = Self::stamp(&mut state);
        state.documents.push(RemoteDocument {
            id: id.clone(),
            fields: DocumentFields {
                title: draft.title,
                description: draft.description,
                url: draft.url,
                category: normalize_category(draft.category),
                created_at: Some(stamp),
                updated_at: Some(stamp),
            },
        });
        self.broadcast(&mut state);

        tracing::debug!(id = %id, "document inserted");
        Ok(id)
    }

    fn apply_patch(&self, id: &str, patch: DashboardPatch) -> Result<()> {
        let mut state = self.lock();
        Self::admit(&mut state, RemoteOp::Patch)?;

        let stamp = Self::stamp(&mut state);
        let document = state
            .documents
            .iter_mut()
            .find(|d| d.id == id)
            .ok_or_else(|| CatalogError::RemoteRequestFailed(format!("no document to update: {id}")))?;

        let fields = &mut document.fields;
        if let Some(title) = patch.title {
            fields.title = title;
        }
        if let Some(description) = patch.description {
            fields.description = description;
        }
        if let Some(url) = patch.url {
            fields.url = url;
        }
        if let Some(category) = patch.category {
            fields.category = normalize_category(category);
        }
        fields.updated_at = Some(stamp);
        self.broadcast(&mut state);

        tracing::debug!(id = %id, "document patched");
        Ok(())
    }

    fn apply_remove(&self, id: &str) -> Result<()> {
        let mut state = self.lock();
        Self::admit(&mut state, RemoteOp::Remove)?;

        let before = state.documents.len();
        state.documents.retain(|d| d.id != id);
        if state.documents.len() != before {
            self.broadcast(&mut state);
            tracing::debug!(id = %id, "document removed");
        }
        Ok(())
    }
}

impl RemoteCollection for MemoryCollection {
    fn insert(&self, draft: DashboardDraft) -> BoxFuture<'_, Result<String>> {
        Box::pin(async move {
            tokio::task::yield_now().await;
            self.apply_insert(draft)
        })
    }

    fn patch(&self, id: &str, patch: DashboardPatch) -> BoxFuture<'_, Result<()>> {
        let id = id.to_string();
        Box::pin(async move {
            tokio::task::yield_now().await;
            self.apply_patch(&id, patch)
        })
    }

    fn remove(&self, id: &str) -> BoxFuture<'_, Result<()>> {
        let id = id.to_string();
        Box::pin(async move {
            tokio::task::yield_now().await;
            self.apply_remove(&id)
        })
    }

    fn watch(&self) -> DocumentStream {
        let rx = self.feed.subscribe();

        stream::unfold((rx, true, false), |(mut rx, first, done)| async move {
            if done {
                return None;
            }
            if !first && rx.changed().await.is_err() {
                return None;
            }
            let feed = rx.borrow_and_update().clone();
            match feed {
                Feed::Documents(documents) => {
                    Some((Ok(documents.as_ref().clone()), (rx, false, false)))
                }
                Feed::Broken(reason) => Some((
                    Err(CatalogError::RemoteRequestFailed(format!("subscription failed: {reason}"))),
                    (rx, false, true),
                )),
            }
        })
        .boxed()
    }
}
