//! Remote document collection abstraction.
//!
//! The remote adapter talks to its backing service only through [`RemoteCollection`]:
//! per-document insert/patch/remove requests plus one standing query ordered by
//! `createdAt` descending. Timestamps are assigned by the service, never by the client.

use crate::domain::error::Result;
use crate::domain::{normalize_category, Dashboard, DashboardDraft, DashboardPatch};
use chrono::{DateTime, Utc};
use futures_util::future::BoxFuture;
use futures_util::stream::BoxStream;
use serde::{Deserialize, Serialize};

/// Stored fields of one document.
///
/// Timestamps are `None` while a server-side write is still pending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentFields {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub url: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// A document as delivered by the standing query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteDocument {
    pub id: String,
    pub fields: DocumentFields,
}

impl RemoteDocument {
    /// Converts into a record. Pending timestamps resolve to `pending_stamp`, and a pending
    /// `updatedAt` falls back to `createdAt`.
    #[must_use]
    pub fn into_dashboard(self, pending_stamp: DateTime<Utc>) -> Dashboard {
        let created_at = self.fields.created_at.unwrap_or(pending_stamp);
        let updated_at = self.fields.updated_at.unwrap_or(created_at).max(created_at);
        Dashboard {
            id: self.id,
            title: self.fields.title,
            description: self.fields.description,
            url: self.fields.url,
            category: normalize_category(self.fields.category),
            created_at,
            updated_at,
        }
    }
}

/// Stream of full query results, newest document first.
pub type DocumentStream = BoxStream<'static, Result<Vec<RemoteDocument>>>;

/// A remote collection of dashboard documents.
///
/// # Contract
///
/// - `insert` assigns the document key and both timestamps on the server.
/// - `patch` refreshes `updatedAt` on the server and fails for a missing document.
/// - `remove` succeeds for a missing document.
/// - `watch` first yields the current result set, then one full result set per change,
///   ordered by `createdAt` descending. An `Err` item ends the subscription.
pub trait RemoteCollection: Send + Sync + 'static {
    fn insert(&self, draft: DashboardDraft) -> BoxFuture<'_, Result<String>>;

    fn patch(&self, id: &str, patch: DashboardPatch) -> BoxFuture<'_, Result<()>>;

    fn remove(&self, id: &str) -> BoxFuture<'_, Result<()>>;

    fn watch(&self) -> DocumentStream;
}
