//! Size-rotated append-only file writer.
//!
//! When the live file grows past the threshold it is shifted to `<name>.1`, existing
//! backups move up by one (`.1` → `.2`, ...), and the oldest beyond the retention limit
//! is removed.

use std::ffi::OsString;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

/// Rotation threshold (10 MiB).
const MAX_FILE_SIZE_BYTES: u64 = 10 * 1024 * 1024;

/// Number of numbered backups kept after rotation.
const MAX_BACKUP_FILES: usize = 3;

/// Thread-safe line writer with numbered rotation.
///
/// The file is opened lazily on the first write, so construction never fails.
pub struct FileWriter {
    file_path: PathBuf,
    max_bytes: u64,
    writer: Mutex<Option<fs::File>>,
}

impl FileWriter {
    pub const fn new(file_path: PathBuf) -> Self {
        Self::with_max_bytes(file_path, MAX_FILE_SIZE_BYTES)
    }

    /// Same as [`new`](Self::new) with a custom rotation threshold.
    pub const fn with_max_bytes(file_path: PathBuf, max_bytes: u64) -> Self {
        Self {
            file_path,
            max_bytes,
            writer: Mutex::new(None),
        }
    }

    /// Appends `line` plus a newline and flushes, rotating first if the file is too big.
    ///
    /// # Errors
    ///
    /// Fails if rotating, opening, writing or flushing the file fails.
    pub fn write_line(&self, line: &str) -> std::io::Result<()> {
        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);

        self.check_and_rotate(&mut writer)?;

        let file = match writer.take() {
            Some(file) => file,
            None => OpenOptions::new()
                .create(true)
                .append(true)
                .open(&self.file_path)?,
        };
        let file = writer.insert(file);

        writeln!(file, "{line}")?;
        file.flush()
    }

    fn check_and_rotate(&self, writer: &mut Option<fs::File>) -> std::io::Result<()> {
        if let Ok(metadata) = fs::metadata(&self.file_path) {
            if metadata.len() > self.max_bytes {
                *writer = None;
                self.rotate_files()?;
            }
        }
        Ok(())
    }

    /// Shifts every backup up by one slot and moves the live file to slot 1.
    fn rotate_files(&self) -> std::io::Result<()> {
        let oldest = backup_path(&self.file_path, MAX_BACKUP_FILES);
        if oldest.exists() {
            fs::remove_file(&oldest)?;
        }

        for slot in (1..MAX_BACKUP_FILES).rev() {
            let from = backup_path(&self.file_path, slot);
            if from.exists() {
                fs::rename(&from, backup_path(&self.file_path, slot + 1))?;
            }
        }

        if self.file_path.exists() {
            fs::rename(&self.file_path, backup_path(&self.file_path, 1))?;
        }
        Ok(())
    }
}

/// `<path>.<slot>`, e.g. `dashcat-spans.jsonl.2`.
fn backup_path(path: &Path, slot: usize) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(format!(".{slot}"));
    PathBuf::from(name)
}

impl std::fmt::Debug for FileWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileWriter")
            .field("file_path", &self.file_path)
            .field("max_bytes", &self.max_bytes)
            .finish_non_exhaustive()
    }
}
