//! # Archive Error Types
//!
//! Structured errors for `luft-archive`. Every variant names the path it
//! concerns and keeps the underlying cause as its `source()`.
//!
//! A missing archive is not an error: `retrieve` returns `Ok(None)`, and
//! listing a source that was never written returns an empty list.

use std::io;
use std::path::PathBuf;

use luft_core::{CanonicalizationError, IdentityError};
use thiserror::Error;

/// Errors from archive store operations.
#[derive(Error, Debug)]
pub enum ArchiveError {
    /// The archive root could not be created, or is not a writable directory.
    #[error("archive root {path} is unavailable: {source}")]
    StorageUnavailable {
        /// The configured root.
        path: PathBuf,
        /// Why it cannot be used.
        #[source]
        source: io::Error,
    },

    /// The source name cannot be used as a partition directory.
    #[error("invalid archive source: {0}")]
    InvalidSource(#[from] IdentityError),

    /// Writing a new archive failed. Nothing is retried.
    #[error("failed to write archive {path}: {source}")]
    Write {
        /// Target identifier path.
        path: PathBuf,
        /// What went wrong.
        #[source]
        source: WriteFailure,
    },

    /// An existing archive could not be read or parsed.
    #[error("failed to read archive {path}: {source}")]
    Read {
        /// The identifier path.
        path: PathBuf,
        /// What went wrong.
        #[source]
        source: ReadFailure,
    },

    /// A source partition exists but could not be enumerated.
    #[error("failed to list archives under {path}: {source}")]
    List {
        /// Directory being walked.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
}

impl ArchiveError {
    /// True when a write was refused because the identifier already exists.
    pub fn is_collision(&self) -> bool {
        matches!(
            self,
            ArchiveError::Write {
                source: WriteFailure::AlreadyExists,
                ..
            }
        )
    }
}

/// Cause of an [`ArchiveError::Write`].
#[derive(Error, Debug)]
pub enum WriteFailure {
    /// Another archive was written for the same source in the same microsecond.
    #[error("identifier already exists")]
    AlreadyExists,

    /// The data could not be converted to JSON.
    #[error("could not encode envelope: {0}")]
    Encode(#[source] serde_json::Error),

    /// The checksum could not be computed.
    #[error("could not checksum data: {0}")]
    Checksum(#[from] CanonicalizationError),

    /// Filesystem failure.
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Cause of an [`ArchiveError::Read`].
#[derive(Error, Debug)]
pub enum ReadFailure {
    /// Filesystem failure other than "not found".
    #[error(transparent)]
    Io(#[from] io::Error),

    /// The file is not a valid archive envelope.
    #[error("malformed envelope: {0}")]
    Malformed(#[source] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn write_error_display_names_path_and_cause() {
        let err = ArchiveError::Write {
            path: PathBuf::from("/archive/solar_wind/2024/03/07/x.json"),
            source: WriteFailure::AlreadyExists,
        };
        let msg = err.to_string();
        assert!(msg.contains("/archive/solar_wind/2024/03/07/x.json"));
        assert!(msg.contains("already exists"));
        assert!(err.is_collision());
    }

    #[test]
    fn io_write_failure_is_not_collision() {
        let err = ArchiveError::Write {
            path: PathBuf::from("x.json"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied").into(),
        };
        assert!(!err.is_collision());
        assert!(err.source().is_some());
    }

    #[test]
    fn storage_unavailable_keeps_source() {
        let err = ArchiveError::StorageUnavailable {
            path: PathBuf::from("/ro"),
            source: io::Error::other("not a directory"),
        };
        assert!(err.to_string().contains("/ro"));
        assert_eq!(err.source().map(|s| s.to_string()), Some("not a directory".into()));
    }

    #[test]
    fn malformed_read_failure_display() {
        let parse_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = ArchiveError::Read {
            path: PathBuf::from("broken.json"),
            source: ReadFailure::Malformed(parse_err),
        };
        assert!(err.to_string().contains("malformed envelope"));
    }
}
