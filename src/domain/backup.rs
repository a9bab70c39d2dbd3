//! Backup document and its JSON codec.
//!
//! A [`BackupDocument`] is the portable snapshot produced by export and consumed by import.
//! Decoding is strict: the document must parse and every record must satisfy the record
//! invariants before any adapter is allowed to act on it.
//!
//! # File Format
//!
//! ```json
//! {
//!   "dashboards": [ { "id": "1", "title": "...", "url": "...", "createdAt": "...", ... } ],
//!   "categories": [],
//!   "lastUpdated": "2024-01-15T00:00:00Z"
//! }
//! ```

use crate::domain::dashboard::Dashboard;
use crate::domain::error::{CatalogError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Category descriptor reserved in the backup format. Export always writes an empty list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardCategory {
    pub id: String,
    pub name: String,
    pub color: String,
}

/// Full snapshot of a record set plus metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupDocument {
    pub dashboards: Vec<Dashboard>,
    #[serde(default)]
    pub categories: Vec<DashboardCategory>,
    pub last_updated: DateTime<Utc>,
}

impl BackupDocument {
    /// Wraps a record set, timestamped `now`, with an empty category list.
    #[must_use]
    pub fn new(dashboards: Vec<Dashboard>, now: DateTime<Utc>) -> Self {
        Self {
            dashboards,
            categories: Vec::new(),
            last_updated: now,
        }
    }

    /// Parses and validates a backup document.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::MalformedData`] if the text is not a backup document or
    /// any record fails validation.
    pub fn from_json(text: &str) -> Result<Self> {
        let document: Self = serde_json::from_str(text)
            .map_err(|e| CatalogError::MalformedData(format!("invalid backup document: {e}")))?;
        document.validate()?;
        Ok(document)
    }

    /// Serializes the document as indented JSON, the layout used for backup files.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::MalformedData`] if serialization fails.
    pub fn to_pretty_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Checks every record and the uniqueness of ids.
    ///
    /// # Errors
    ///
    /// Returns the first violation found as [`CatalogError::MalformedData`].
    pub fn validate(&self) -> Result<()> {
        validate_record_set(&self.dashboards)
    }
}

/// Validates a whole record set: every record individually, then id uniqueness.
///
/// # Errors
///
/// Returns [`CatalogError::MalformedData`] describing the first violation.
pub fn validate_record_set(records: &[Dashboard]) -> Result<()> {
    let mut seen = HashSet::with_capacity(records.len());
    for record in records {
        record.validate()?;
        if !seen.insert(record.id.as_str()) {
            return Err(CatalogError::MalformedData(format!(
                "duplicate dashboard id {}",
                record.id
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DashboardDraft;
    use crate::domain::ErrorKind;

    fn record(id: &str) -> Dashboard {
        Dashboard::from_draft(id, DashboardDraft::new(format!("t{id}"), "https://x.test"), Utc::now())
    }

    #[test]
    fn exported_shape_has_reserved_categories() {
        let doc = BackupDocument::new(vec![record("1")], Utc::now());
        let json: serde_json::Value = serde_json::from_str(&doc.to_pretty_json().unwrap()).unwrap();

        assert_eq!(json["categories"], serde_json::json!([]));
        assert!(json["lastUpdated"].is_string());
        assert_eq!(json["dashboards"].as_array().map(Vec::len), Some(1));
    }

    #[test]
    fn rejects_duplicate_ids() {
        let doc = BackupDocument::new(vec![record("1"), record("1")], Utc::now());
        let err = BackupDocument::from_json(&doc.to_pretty_json().unwrap()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedData);
    }

    #[test]
    fn rejects_bare_arrays() {
        let err = BackupDocument::from_json("[]").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedData);
    }

    #[test]
    fn categories_default_to_empty_when_missing() {
        let text = r#"{"dashboards": [], "lastUpdated": "2024-01-15T00:00:00.000Z"}"#;
        let doc = BackupDocument::from_json(text).unwrap();
        assert!(doc.categories.is_empty());
    }
}
