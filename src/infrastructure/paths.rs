//! Path helpers: the default data directory, tilde expansion and backup file names.

use chrono::{DateTime, Utc};
use std::path::PathBuf;

/// Application directory name under the platform data directory.
const APP_DIR: &str = "dashcat";

/// Returns the default data directory for the file store.
///
/// Resolution order: `$XDG_DATA_HOME/dashcat`, then `$HOME/.local/share/dashcat`, then
/// `./.dashcat` when neither variable is set.
#[must_use]
pub fn get_data_dir() -> PathBuf {
    if let Some(xdg) = std::env::var_os("XDG_DATA_HOME").filter(|v| !v.is_empty()) {
        return PathBuf::from(xdg).join(APP_DIR);
    }
    if let Some(home) = std::env::var_os("HOME").filter(|v| !v.is_empty()) {
        return PathBuf::from(home).join(".local").join("share").join(APP_DIR);
    }
    PathBuf::from(format!(".{APP_DIR}"))
}

/// Expands a leading `~` to the user's home directory.
///
/// Paths without a tilde, and all paths when `HOME` is unset, are returned unchanged.
///
/// # Examples
///
/// ```
/// use dashcat::infrastructure::expand_tilde;
///
/// assert_eq!(expand_tilde("/absolute/path"), std::path::PathBuf::from("/absolute/path"));
/// ```
#[must_use]
pub fn expand_tilde(path: &str) -> PathBuf {
    let home = std::env::var_os("HOME").filter(|v| !v.is_empty());
    match (path, home) {
        ("~", Some(home)) => PathBuf::from(home),
        (p, Some(home)) if p.starts_with("~/") => PathBuf::from(home).join(&p[2..]),
        (p, _) => PathBuf::from(p),
    }
}

/// File name for a downloaded backup taken at `now`.
///
/// Colons are avoided so the name is valid on every filesystem.
#[must_use]
pub fn backup_file_name(now: DateTime<Utc>) -> String {
    format!("dashboard-backup-{}.json", now.format("%Y-%m-%dT%H-%M-%S%.3fZ"))
}
