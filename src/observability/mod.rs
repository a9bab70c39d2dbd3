//! OpenTelemetry tracing with file-based span export.
//!
//! ```text
//! tracing macros → tracing-opentelemetry → SDK tracer → JsonLinesExporter → FileWriter
//! ```
//!
//! Spans land in `<data_dir>/dashcat-spans.jsonl`, one JSON object per line. The file
//! rotates at 10 MiB and keeps three numbered backups.
//!
//! Filter resolution: `RUST_LOG`, then [`Config::trace_level`](crate::Config), whose
//! default is `"info"`.
//!
//! # Modules
//!
//! - [`init`]: subscriber setup
//! - `tracer`: tracer provider and JSON-lines span exporter
//! - `file_writer`: size-rotated file writer

mod file_writer;
pub mod init;
mod tracer;

pub use init::{init_tracing, SPAN_FILE_NAME};
