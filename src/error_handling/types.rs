//! Error type definitions.
//!
//! This module defines the error taxonomy used throughout the application:
//!
//! - **Fatal**: [`InputError`] and [`ConfigError`] abort the run before any
//!   partial output is produced.
//! - **Row-level**: [`SchemaError`] and [`LookupError`] mark a single row as
//!   failed; the row stays in the dataset with placeholder values and the run
//!   continues.

use std::path::PathBuf;

use log::SetLoggerError;
use reqwest::Error as ReqwestError;
use thiserror::Error;

/// Error types for initialization failures.
#[derive(Error, Debug)]
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),

    /// Error initializing the HTTP client.
    #[error("HTTP client initialization error: {0}")]
    HttpClientError(#[from] ReqwestError),
}

/// Fatal error reading the input target.
///
/// A total read failure aborts the run; individually malformed lines inside a
/// readable file are skipped with a warning instead (see `input::read_input`).
#[derive(Error, Debug)]
pub enum InputError {
    /// The input path does not exist or is not a regular file.
    #[error("input file not found: {0}")]
    FileNotFound(PathBuf),

    /// The file exists but could not be opened or decoded at all.
    #[error("failed to read input file {path}: {reason}")]
    Unreadable {
        /// Path of the file that failed to read.
        path: PathBuf,
        /// Underlying reader error, flattened to a message.
        reason: String,
    },
}

/// Fatal configuration error, detected before any network I/O.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The `--label` option names a column that exists nowhere in the dataset.
    #[error("unknown label column '{label}'; available columns: {available}")]
    UnknownLabelColumn {
        /// The label the caller asked for.
        label: String,
        /// Comma-separated list of resolvable column names.
        available: String,
    },

    /// The `--api-url` option is not a valid HTTP(S) base URL.
    #[error("invalid api url '{0}'")]
    InvalidApiUrl(String),
}

/// Row-level error: the row has no resolvable IP value.
///
/// Raised when the cell at the dataset's designated IP column is empty or
/// blank. Never fatal; the affected row is aggregated with placeholder base
/// fields and flagged as failed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("row {row} has no IP value in column '{column}'")]
pub struct SchemaError {
    /// Zero-based index of the row within the input.
    pub row: usize,
    /// Output name of the designated IP column.
    pub column: String,
}

/// Row-level error from a geolocation lookup.
///
/// Transient failures (timeouts, connection errors, 5xx, exhausted 429
/// retries) may succeed on a later run; permanent failures (other 4xx,
/// undecodable payloads) will not.
#[derive(Error, Debug, Clone)]
pub enum LookupError {
    /// Network-level or service-side failure that may resolve itself.
    #[error("transient lookup failure: {0}")]
    Transient(String),

    /// Definitive rejection by the service; retrying is pointless.
    #[error("permanent lookup failure: {0}")]
    Permanent(String),
}

impl LookupError {
    /// Whether this failure is worth retrying with backoff.
    pub fn is_transient(&self) -> bool {
        matches!(self, LookupError::Transient(_))
    }
}
