//! # Error Types — Structured Error Hierarchy
//!
//! Defines the error types shared by every LUFT crate. All errors use
//! `thiserror` for derive-based `Display` and `Error` implementations.
//!
//! ## Design
//!
//! - Canonicalization errors carry the underlying serializer failure.
//! - Identity errors name the rejected value and the rule it broke.
//! - Timestamp errors include the offending input verbatim.

use thiserror::Error;

/// Error during canonical serialization.
#[derive(Error, Debug)]
pub enum CanonicalizationError {
    /// The value could not be converted to a JSON tree (e.g. a map with
    /// non-string keys, or a failing `Serialize` impl).
    #[error("serialization failed: {0}")]
    SerializationFailed(#[from] serde_json::Error),
}

/// A domain identifier failed validation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IdentityError {
    /// Source names become directory names and must be a single safe segment.
    #[error("invalid source name {value:?}: {reason}")]
    InvalidSourceName {
        /// The rejected input.
        value: String,
        /// Which rule it broke.
        reason: &'static str,
    },
}

/// A timestamp or date string could not be interpreted.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TimestampError {
    /// Not an ISO-8601 `YYYY-MM-DDTHH:MM:SS[.ffffff]` timestamp.
    #[error("invalid archive timestamp {input:?}: {reason}")]
    InvalidTimestamp {
        /// The rejected input.
        input: String,
        /// Parser diagnostic.
        reason: String,
    },

    /// Not a strict `YYYY-MM-DD` partition date.
    #[error("invalid partition date {input:?}: expected YYYY-MM-DD")]
    InvalidDate {
        /// The rejected input.
        input: String,
    },
}

/// The logging pipeline could not be constructed.
#[derive(Error, Debug)]
pub enum TelemetryError {
    /// Unknown log level name.
    #[error("unknown log level {0:?}; expected one of DEBUG, INFO, WARNING, ERROR, CRITICAL")]
    UnknownLevel(String),

    /// The log file (or its parent directory) could not be opened.
    #[error("cannot open log file {path}: {source}")]
    LogFile {
        /// Path of the log file.
        path: std::path::PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },
}
