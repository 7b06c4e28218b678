//! Error types for record storage operations.

use std::path::PathBuf;
use thiserror::Error;

/// Errors returned by the record store and its backing tiers.
///
/// A missing record is not an error; lookup paths return `Option` instead.
#[derive(Debug, Error)]
pub enum MemoryError {
    /// A record failed validation before any I/O happened.
    #[error("invalid record: {0}")]
    InvalidRecord(String),
    /// Durable data exists but could not be decoded.
    #[error("malformed record data: {0}")]
    MalformedRecord(String),
    /// The backing location could not be read or written at all.
    #[error("store unavailable at {path}: {source}")]
    StoreUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
