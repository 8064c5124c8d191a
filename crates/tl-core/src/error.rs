//! Error types for the log engine.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failures surfaced by the backing stores.
///
/// Malformed content is never an error: unparseable log lines, task lines and
/// ledger rows are skipped. Only I/O against an existing backing store fails.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading an existing backing file failed.
    #[error("failed to read {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// Writing to a backing file failed (disk full, permission denied, ...).
    #[error("failed to write {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// Reading a caller-supplied stream failed.
    #[error("failed to read stream")]
    Stream(#[source] io::Error),
    /// Encoding a ledger row failed.
    #[error("failed to encode CSV row")]
    Csv(#[from] csv::Error),
}

/// Errors from parsing names of report kinds, styles and orderings.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("unknown report kind: {value}")]
    UnknownReportKind { value: String },

    #[error("unknown report style: {value}")]
    UnknownReportStyle { value: String },

    #[error("unknown entry order: {value}")]
    UnknownEntryOrder { value: String },
}

pub type Result<T, E = StoreError> = std::result::Result<T, E>;
