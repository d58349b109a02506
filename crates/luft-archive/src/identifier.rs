//! # Archive Identifiers
//!
//! An archive is identified by the path it was written to:
//!
//! ```text
//! {root}/{source}/{YYYY}/{MM}/{DD}/{YYYYMMDD_HHMMSS_ffffff}.json
//! ```
//!
//! The path doubles as the caller's handle. Callers should treat it as an
//! opaque but stable string; within one source, identifiers sort
//! chronologically by file name.

use std::convert::Infallible;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use luft_core::{ArchiveTimestamp, SourceName};
use serde::{Deserialize, Serialize};

/// Extension of every archive file.
pub const ARCHIVE_EXTENSION: &str = "json";

/// The path of one archive file.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArchiveId(PathBuf);

impl ArchiveId {
    /// Wrap an existing path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    /// The identifier an archive of `source` written at `at` receives under `root`.
    pub fn for_partition(root: &Path, source: &SourceName, at: &ArchiveTimestamp) -> Self {
        let [year, month, day] = at.partition_date().segments();
        Self(
            root.join(source.as_str())
                .join(year)
                .join(month)
                .join(day)
                .join(format!("{}.{ARCHIVE_EXTENSION}", at.file_stem())),
        )
    }

    /// Access the path.
    pub fn as_path(&self) -> &Path {
        &self.0
    }

    /// Consume into the path.
    pub fn into_path_buf(self) -> PathBuf {
        self.0
    }

    /// The file name, e.g. `20240307_134500_123456.json`.
    pub fn file_name(&self) -> Option<&str> {
        self.0.file_name().and_then(|n| n.to_str())
    }
}

impl fmt::Display for ArchiveId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

impl FromStr for ArchiveId {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(PathBuf::from(s)))
    }
}

impl AsRef<Path> for ArchiveId {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl From<PathBuf> for ArchiveId {
    fn from(path: PathBuf) -> Self {
        Self(path)
    }
}

/// True if `path` names an archive file by extension.
pub(crate) fn is_archive_file(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some(ARCHIVE_EXTENSION)
}
