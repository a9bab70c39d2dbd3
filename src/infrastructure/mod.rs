//! Infrastructure layer for filesystem and environment interactions.

pub mod paths;

pub use paths::{backup_file_name, expand_tilde, get_data_dir};
