//! Dashboard record model and its input types.
//!
//! A [`Dashboard`] is one catalogued link to an external portal. New records are described
//! by a [`DashboardDraft`] (everything except identity and timestamps) and changed through
//! a [`DashboardPatch`], where every field is optional so collaborators can submit only
//! what the user edited.

use crate::domain::error::{CatalogError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One catalogued external link with metadata.
///
/// Serialized with camelCase keys so that persisted blobs and backup files keep the
/// `createdAt`/`updatedAt` layout. An absent `category` is omitted from the JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Dashboard {
    /// Builds a record from a draft, stamping both timestamps with `now`.
    #[must_use]
    pub fn from_draft(id: impl Into<String>, draft: DashboardDraft, now: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            title: draft.title,
            description: draft.description,
            url: draft.url,
            category: normalize_category(draft.category),
            created_at: now,
            updated_at: now,
        }
    }

    /// Merges the supplied fields and refreshes `updated_at`.
    ///
    /// `updated_at` never moves before `created_at`, even if the clock went backwards.
    pub fn apply(&mut self, patch: DashboardPatch, now: DateTime<Utc>) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(url) = patch.url {
            self.url = url;
        }
        if let Some(category) = patch.category {
            self.category = normalize_category(category);
        }
        self.updated_at = now.max(self.created_at);
    }

    /// Checks the invariants a record must satisfy to be visible.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::MalformedData`] naming the offending record.
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(CatalogError::MalformedData(format!(
                "dashboard '{}' has an empty id",
                self.title
            )));
        }
        if self.title.trim().is_empty() {
            return Err(CatalogError::MalformedData(format!(
                "dashboard {} has an empty title",
                self.id
            )));
        }
        if self.url.trim().is_empty() {
            return Err(CatalogError::MalformedData(format!(
                "dashboard {} has an empty url",
                self.id
            )));
        }
        if self.updated_at < self.created_at {
            return Err(CatalogError::MalformedData(format!(
                "dashboard {} was updated before it was created",
                self.id
            )));
        }
        Ok(())
    }
}

/// Fields supplied by the user when creating a dashboard.
///
/// # Examples
///
/// ```
/// use dashcat::domain::DashboardDraft;
///
/// let draft = DashboardDraft::new("CNPq", "https://www.gov.br/cnpq")
///     .with_description("Editais")
///     .with_category("CNPq");
/// assert!(draft.validate().is_ok());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardDraft {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub url: String,
    #[serde(default)]
    pub category: Option<String>,
}

impl DashboardDraft {
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = normalize_category(Some(category.into()));
        self
    }

    /// Checks that the required fields are present.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::ValidationFailed`] if `title` or `url` is blank.
    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(CatalogError::ValidationFailed("title is required".to_string()));
        }
        if self.url.trim().is_empty() {
            return Err(CatalogError::ValidationFailed("url is required".to_string()));
        }
        Ok(())
    }
}

/// Partial update of a dashboard. `None` leaves a field untouched.
///
/// `category` is doubly optional: `Some(None)` clears the category, `None` keeps it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DashboardPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
    pub category: Option<Option<String>>,
}

impl DashboardPatch {
    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    #[must_use]
    pub fn category(mut self, category: Option<String>) -> Self {
        self.category = Some(category);
        self
    }

    /// Rejects patches that would blank a required field.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::ValidationFailed`] if the patch sets an empty title or url.
    pub fn validate(&self) -> Result<()> {
        if self.title.as_deref().is_some_and(|t| t.trim().is_empty()) {
            return Err(CatalogError::ValidationFailed("title cannot be empty".to_string()));
        }
        if self.url.as_deref().is_some_and(|u| u.trim().is_empty()) {
            return Err(CatalogError::ValidationFailed("url cannot be empty".to_string()));
        }
        Ok(())
    }
}

/// Empty or whitespace-only categories mean "uncategorized".
#[must_use]
pub fn normalize_category(category: Option<String>) -> Option<String> {
    category
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).single().unwrap()
    }

    #[test]
    fn empty_category_means_uncategorized() {
        let draft = DashboardDraft::new("A", "https://a.test").with_category("  ");
        let record = Dashboard::from_draft("1", draft, at(10));
        assert_eq!(record.category, None);
    }

    #[test]
    fn apply_touches_only_supplied_fields() {
        let draft = DashboardDraft::new("A", "https://a.test")
            .with_description("first")
            .with_category("CNPq");
        let mut record = Dashboard::from_draft("1", draft, at(10));

        record.apply(DashboardPatch::default().title("B"), at(20));

        assert_eq!(record.title, "B");
        assert_eq!(record.description, "first");
        assert_eq!(record.category.as_deref(), Some("CNPq"));
        assert_eq!(record.created_at, at(10));
        assert_eq!(record.updated_at, at(20));
    }

    #[test]
    fn apply_can_clear_category() {
        let draft = DashboardDraft::new("A", "https://a.test").with_category("CNPq");
        let mut record = Dashboard::from_draft("1", draft, at(10));

        record.apply(DashboardPatch::default().category(None), at(11));

        assert_eq!(record.category, None);
    }

    #[test]
    fn updated_at_never_precedes_created_at() {
        let mut record = Dashboard::from_draft("1", DashboardDraft::new("A", "u"), at(100));
        record.apply(DashboardPatch::default().title("B"), at(50));
        assert_eq!(record.updated_at, at(100));
    }

    #[test]
    fn draft_requires_title_and_url() {
        assert!(DashboardDraft::new("", "https://a.test").validate().is_err());
        assert!(DashboardDraft::new("A", " ").validate().is_err());
        assert!(DashboardDraft::new("A", "https://a.test").validate().is_ok());
    }

    #[test]
    fn patch_cannot_blank_required_fields() {
        assert!(DashboardPatch::default().title("").validate().is_err());
        assert!(DashboardPatch::default().url("").validate().is_err());
        assert!(DashboardPatch::default().description("").validate().is_ok());
    }

    #[test]
    fn serializes_with_camel_case_timestamps() {
        let record = Dashboard::from_draft("1", DashboardDraft::new("A", "u"), at(0));
        let json = serde_json::to_value(&record).unwrap();

        assert!(json.get("createdAt").is_some());
        assert!(json.get("updatedAt").is_some());
        assert!(json.get("category").is_none());
    }

    #[test]
    fn parses_millisecond_iso_timestamps() {
        let json = r#"{
            "id": "1",
            "title": "Portal",
            "description": "",
            "url": "https://example.test",
            "category": "CNPq",
            "createdAt": "2024-01-15T00:00:00.000Z",
            "updatedAt": "2024-01-15T00:00:00.000Z"
        }"#;
        let record: Dashboard = serde_json::from_str(json).unwrap();
        assert_eq!(record.created_at, Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap());
        assert!(record.validate().is_ok());
    }
}
