//! Catalog view state: search, category filter and selection over a published snapshot.
//!
//! [`CatalogView`] separates core data (the last snapshot an adapter published) from
//! derived state (the filtered list and the selection cursor). Whenever the snapshot or a
//! filter changes, [`apply_filters`](CatalogView::apply_filters) recomputes the derived
//! state and clamps the cursor.
//!
//! # Example
//!
//! ```rust
//! use dashcat::app::CatalogView;
//! use dashcat::storage::seed_dashboards;
//!
//! let mut view = CatalogView::new(seed_dashboards().into());
//! view.set_category(Some("CAPES".to_string()));
//! assert_eq!(view.filtered().len(), 1);
//! ```

use crate::domain::Dashboard;
use crate::sync::Snapshot;
use fuzzy_matcher::skim::SkimMatcherV2;

/// Filterable, navigable view over one record set.
#[derive(Debug, Clone)]
pub struct CatalogView {
    /// Last published snapshot. Never mutated in place.
    records: Snapshot,

    /// Records passing the search query and the category filter, best match first.
    filtered: Vec<Dashboard>,

    /// Zero-based index into `filtered`. Wraps around during navigation.
    selected_index: usize,

    search_query: String,

    /// `None` shows every category.
    category: Option<String>,
}

impl Default for CatalogView {
    fn default() -> Self {
        Self::new(Vec::new().into())
    }
}

impl CatalogView {
    #[must_use]
    pub fn new(records: Snapshot) -> Self {
        let mut view = Self {
            records,
            filtered: Vec::new(),
            selected_index: 0,
            search_query: String::new(),
            category: None,
        };
        view.apply_filters();
        view
    }

    /// Adopts a newly published snapshot, keeping the query, category and cursor.
    pub fn set_records(&mut self, records: Snapshot) {
        self.records = records;
        self.apply_filters();
    }

    pub fn set_search(&mut self, query: impl Into<String>) {
        self.search_query = query.into();
        self.apply_filters();
    }

    /// Restricts the view to one category. Empty names clear the filter.
    pub fn set_category(&mut self, category: Option<String>) {
        self.category = crate::domain::normalize_category(category);
        self.apply_filters();
    }

    #[must_use]
    pub fn records(&self) -> &Snapshot {
        &self.records
    }

    #[must_use]
    pub fn filtered(&self) -> &[Dashboard] {
        &self.filtered
    }

    #[must_use]
    pub fn search_query(&self) -> &str {
        &self.search_query
    }

    #[must_use]
    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    #[must_use]
    pub const fn selected_index(&self) -> usize {
        self.selected_index
    }

    #[must_use]
    pub fn selected(&self) -> Option<&Dashboard> {
        self.filtered.get(self.selected_index)
    }

    /// Distinct non-empty categories of the whole snapshot, in first-seen order.
    #[must_use]
    pub fn categories(&self) -> Vec<String> {
        let mut seen: Vec<String> = Vec::new();
        for category in self.records.iter().filter_map(|d| d.category.as_deref()) {
            if !seen.iter().any(|c| c == category) {
                seen.push(category.to_string());
            }
        }
        seen
    }

    /// Moves the cursor down by one, wrapping to the top. No-op on an empty list.
    pub fn move_selection_down(&mut self) {
        if self.filtered.is_empty() {
            return;
        }
        self.selected_index = (self.selected_index + 1) % self.filtered.len();
    }

    /// Moves the cursor up by one, wrapping to the bottom. No-op on an empty list.
    pub fn move_selection_up(&mut self) {
        if self.filtered.is_empty() {
            return;
        }
        if self.selected_index == 0 {
            self.selected_index = self.filtered.len() - 1;
        } else {
            self.selected_index -= 1;
        }
    }

    /// Recomputes the filtered list from the snapshot.
    ///
    /// A record passes when it belongs to the selected category (if any) and the whole
    /// query, ignoring case, occurs in its title, description or url. With a query, the
    /// survivors are ordered by their best fuzzy score; ties keep snapshot order.
    pub fn apply_filters(&mut self) {
        use fuzzy_matcher::FuzzyMatcher;

        let _span = tracing::debug_span!(
            "apply_filters",
            total_records = self.records.len(),
            query_len = self.search_query.len(),
            category = ?self.category
        )
        .entered();

        let query = self.search_query.trim().to_lowercase();
        let matcher = SkimMatcherV2::default().ignore_case();

        let mut scored: Vec<(i64, &Dashboard)> = self
            .records
            .iter()
            .filter(|record| {
                self.category
                    .as_ref()
                    .map_or(true, |c| record.category.as_ref() == Some(c))
            })
            .filter_map(|record| {
                if query.is_empty() {
                    return Some((0, record));
                }
                let fields = [&record.title, &record.description, &record.url];
                if !fields.iter().any(|f| f.to_lowercase().contains(&query)) {
                    return None;
                }
                let score = fields
                    .iter()
                    .filter_map(|f| matcher.fuzzy_match(f, &query))
                    .max()
                    .unwrap_or(0);
                Some((score, record))
            })
            .collect();

        scored.sort_by(|a, b| b.0.cmp(&a.0));
        self.filtered = scored.into_iter().map(|(_, record)| record.clone()).collect();

        if self.filtered.is_empty() {
            self.selected_index = 0;
        } else {
            self.selected_index = self.selected_index.min(self.filtered.len() - 1);
        }

        tracing::debug!(filtered_count = self.filtered.len(), "filters applied");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DashboardDraft;
    use chrono::Utc;

    fn record(id: &str, title: &str, category: &str) -> Dashboard {
        Dashboard::from_draft(
            id,
            DashboardDraft::new(title, format!("https://{id}.test")).with_category(category),
            Utc::now(),
        )
    }

    fn view() -> CatalogView {
        CatalogView::new(
            vec![
                record("a", "Alpha", "X"),
                record("b", "Beta", "Y"),
                record("c", "Gamma", "X"),
            ]
            .into(),
        )
    }

    #[test]
    fn selection_wraps_both_ways() {
        let mut view = view();
        view.move_selection_up();
        assert_eq!(view.selected_index(), 2);
        view.move_selection_down();
        assert_eq!(view.selected_index(), 0);
    }

    #[test]
    fn cursor_is_clamped_when_list_shrinks() {
        let mut view = view();
        view.move_selection_up();
        view.set_category(Some("X".to_string()));
        assert_eq!(view.filtered().len(), 2);
        assert_eq!(view.selected_index(), 1);
    }

    #[test]
    fn blank_category_shows_everything() {
        let mut view = view();
        view.set_category(Some("  ".to_string()));
        assert_eq!(view.category(), None);
        assert_eq!(view.filtered().len(), 3);
    }

    #[test]
    fn equal_scores_keep_snapshot_order() {
        let mut view = CatalogView::new(
            vec![
                record("b", "Alpha", "X"),
                record("c", "Gamma", "X"),
                record("a", "Alpha", "Y"),
            ]
            .into(),
        );
        view.set_search("ALPHA");
        let ids: Vec<_> = view.filtered().iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, ["b", "a"]);
    }

    #[test]
    fn empty_view_has_no_selection() {
        let mut view = CatalogView::default();
        view.move_selection_down();
        assert!(view.selected().is_none());
        assert!(view.categories().is_empty());
    }
}
