//! Domain layer: the record model, the backup document and the error taxonomy.
//!
//! Nothing here touches storage or the network; adapters in [`crate::sync`] build on
//! these types.
//!
//! - [`error`]: Error types and result aliases
//! - [`dashboard`]: Record model, drafts and patches
//! - [`backup`]: Backup document and its validating codec
//!
//! # Examples
//!
//! ```
//! use dashcat::domain::{Dashboard, DashboardDraft, Result};
//!
//! fn build() -> Result<Dashboard> {
//!     let draft = DashboardDraft::new("FAPESP", "https://fapesp.br/oportunidades");
//!     draft.validate()?;
//!     Ok(Dashboard::from_draft("1", draft, chrono::Utc::now()))
//! }
//! # build().unwrap();
//! ```

pub mod backup;
pub mod dashboard;
pub mod error;

pub use backup::{validate_record_set, BackupDocument, DashboardCategory};
pub use dashboard::{normalize_category, Dashboard, DashboardDraft, DashboardPatch};
pub use error::{CatalogError, ErrorKind, Result};
