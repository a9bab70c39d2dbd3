//! Presentation-side collaborators of the sync layer.
//!
//! Nothing here touches a store. Each type consumes published snapshots or single records
//! and derives what a front end renders:
//!
//! ```text
//! Adapter ──publish──→ Snapshot ──→ CatalogView (search, category, cursor)
//!                                        │
//!                                        └──selected──→ SharePanel (text, links)
//!
//! ManagerGate ──unlocked──→ create / update / delete / import
//! ```
//!
//! # Modules
//!
//! - [`gate`]: PIN gate in front of mutating operations
//! - [`share`]: share text and target links
//! - [`state`]: filtered, navigable catalog view

pub mod gate;
pub mod share;
pub mod state;

pub use gate::ManagerGate;
pub use share::{encode_component, SharePanel, ShareTarget};
pub use state::CatalogView;
