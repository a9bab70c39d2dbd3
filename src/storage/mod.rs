//! Storage layer for the local adapter.
//!
//! The local adapter persists its record set as JSON blobs in a synchronous key-value
//! store. This module provides the store abstraction, two implementations and the seed
//! dataset adopted on first run.
//!
//! # Modules
//!
//! - `backend`: Key-value trait shared by all stores
//! - `json`: Directory of JSON files with atomic writes
//! - `memory`: Shared in-memory map with failure switches
//! - `seed`: Default dataset

pub mod backend;
pub mod json;
pub mod memory;
pub mod seed;

pub use backend::KeyValueStore;
pub use json::FileStore;
pub use memory::MemoryStore;
pub use seed::seed_dashboards;
