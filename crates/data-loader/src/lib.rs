//! # Moodlens Data Loader
//!
//! Turns the two CSV exports into validated, typed tables.
//!
//! ## Architectural Principles
//!
//! - **Boundary crate:** All file and format problems are caught here and
//!   reported as a `LoadError` that names the file, row, column and expected
//!   format. Nothing past this crate sees a raw string column.
//! - **Schema first:** Header names are resolved to column positions once per
//!   file (`TradeSchema`, `SentimentSchema`) before any row is parsed.
//!
//! ## Public API
//!
//! - `load_dataset`: loads both files from the configured directory and joins them.
//! - `load_trades` / `read_trades`, `load_sentiment` / `read_sentiment`: the
//!   single-table readers, from a path or from any `Read`.
//! - `join_sentiment`: the many-to-one day join.

pub mod dataset;
pub mod error;
pub mod schema;
pub mod sentiment;
pub mod trades;

pub use dataset::{join_sentiment, load_dataset, Dataset, LoadStats};
pub use error::LoadError;
pub use schema::{SentimentSchema, TradeSchema};
pub use sentiment::{load_sentiment, read_sentiment};
pub use trades::{load_trades, read_trades, TradeTable};

use std::fs::File;
use std::io::ErrorKind;
use std::path::Path;

/// Opens an input file, turning "not found" into an instruction for the user.
pub(crate) fn open_source(path: &Path, kind: &'static str, expected: &'static str) -> Result<File, LoadError> {
    File::open(path).map_err(|source| match source.kind() {
        ErrorKind::NotFound => LoadError::FileNotFound {
            file: path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default(),
            directory: path
                .parent()
                .filter(|dir| !dir.as_os_str().is_empty())
                .map(|dir| dir.display().to_string())
                .unwrap_or_else(|| ".".to_string()),
            kind,
            expected,
        },
        _ => LoadError::Io { path: path.display().to_string(), source },
    })
}
