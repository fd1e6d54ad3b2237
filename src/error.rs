//! Error handling for crash data reconciliation.
//!
//! Unit-level problems (missing files, malformed lines, short rows) are not
//! errors: they are recorded as diagnostics and the run carries on. The types
//! here cover run-level failures only: unreadable configuration, invalid
//! canonical schemas, report I/O and sink failures.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReconcileError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("Invalid configuration file {path}: {source}")]
    ConfigFile {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Invalid canonical schema for table '{table}': {reason}")]
    InvalidSchema { table: String, reason: String },

    #[error("Failed to publish table '{table}': {reason}")]
    Publish { table: String, reason: String },
}

impl ReconcileError {
    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create an invalid schema error
    pub fn invalid_schema(table: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidSchema {
            table: table.into(),
            reason: reason.into(),
        }
    }

    /// Create a publish error
    pub fn publish(table: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Publish {
            table: table.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ReconcileError>;
