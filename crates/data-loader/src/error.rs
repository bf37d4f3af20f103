use core_types::CoreError;
use thiserror::Error;

/// Everything that can go wrong while turning the two CSV exports into tables.
///
/// Each message names the file involved and, where it applies, the row,
/// column and expected format, so it can be shown to the user as-is.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error(
        "Could not find '{file}' in '{directory}'. Place the {kind} export there under exactly that name. Expected format: {expected}."
    )]
    FileNotFound {
        file: String,
        directory: String,
        kind: &'static str,
        expected: &'static str,
    },

    #[error("Could not open '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{file}: missing required column '{column}' (found: {found}). Expected format: {expected}.")]
    MissingColumn {
        file: String,
        column: &'static str,
        found: String,
        expected: &'static str,
    },

    #[error("{file}, row {row}, column '{column}': could not parse '{value}', expected {expected}.")]
    Parse {
        file: String,
        row: usize,
        column: &'static str,
        value: String,
        expected: &'static str,
    },

    #[error("{file}: malformed CSV: {source}")]
    Csv {
        file: String,
        #[source]
        source: csv::Error,
    },

    #[error("{file}, row {row}: {source}")]
    DuplicateDay {
        file: String,
        row: usize,
        #[source]
        source: CoreError,
    },
}
