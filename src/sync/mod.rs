//! Data synchronization layer.
//!
//! Two adapters implement the [`DashboardStore`] contract:
//!
//! - [`LocalAdapter`] persists whole-set JSON blobs in a [`KeyValueStore`](crate::storage::KeyValueStore)
//!   and publishes every mutation before its future resolves.
//! - [`RemoteAdapter`] mirrors a [`RemoteCollection`] through a standing subscription and
//!   only publishes what the collection echoes back.

pub mod collection;
pub mod local;
pub mod memory_collection;
pub mod remote;
pub mod status;
pub mod store;

pub use collection::{DocumentFields, DocumentStream, RemoteCollection, RemoteDocument};
pub use local::{LocalAdapter, LEGACY_KEY, STORAGE_KEY};
pub use memory_collection::{MemoryCollection, RemoteOp};
pub use remote::RemoteAdapter;
pub use status::SyncCell;
pub use store::{Capabilities, DashboardStore, Phase, Snapshot, StatusError};
