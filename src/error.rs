//! Crate-wide error type.
//!
//! Every failure surfaces as a short, human-readable message naming the
//! operation and cause. Repository calls are single statements, so a failed
//! call never leaves the store partially written.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CrmError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Home directory not found")]
    HomeDirNotFound,

    #[error("No contact with id {0}")]
    ContactNotFound(i64),

    #[error("Unsupported import format: .{0}")]
    UnsupportedFormat(String),

    #[error("Workbook error: {0}")]
    Workbook(String),

    #[error("CSV error at line {line}: {msg}")]
    Csv { line: usize, msg: String },

    #[error("Unknown template placeholder: {{{0}}}")]
    UnknownPlaceholder(String),

    #[error("Malformed template: {0}")]
    BadTemplate(String),
}
