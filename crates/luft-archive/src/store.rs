//! # Archive Store
//!
//! Durable, date-partitioned storage for snapshots. Each call to
//! [`ArchiveStore::archive`] writes one self-contained envelope file and
//! returns its path as the identifier.
//!
//! ## Write Invariant
//!
//! Archive files are opened with `create_new(true)`. An existing file is
//! never overwritten: a second write for the same source in the same
//! microsecond fails with [`WriteFailure::AlreadyExists`] and the first
//! archive is left intact. There is no update or delete API.
//!
//! ## Concurrency
//!
//! All operations are blocking and lock-free. Writers on distinct
//! timestamps touch distinct files; the store does not coordinate
//! concurrent writers beyond the exclusive create.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use luft_core::{ArchiveTimestamp, PartitionDate, SourceName, Telemetry};
use serde::Serialize;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::envelope::{ArchiveEnvelope, Metadata};
use crate::error::{ArchiveError, ReadFailure, WriteFailure};
use crate::identifier::{is_archive_file, ArchiveId};

/// A filesystem-backed archive store.
#[derive(Debug, Clone)]
pub struct ArchiveStore {
    root: PathBuf,
    telemetry: Telemetry,
}

impl ArchiveStore {
    /// Open (and if necessary create) the archive root.
    ///
    /// Idempotent. Fails with [`ArchiveError::StorageUnavailable`] if the
    /// path cannot be created or is not a writable directory.
    pub fn open(root: impl Into<PathBuf>, telemetry: Telemetry) -> Result<Self, ArchiveError> {
        let root = root.into();
        let unavailable = |source: io::Error| ArchiveError::StorageUnavailable {
            path: root.clone(),
            source,
        };

        fs::create_dir_all(&root).map_err(unavailable)?;
        let meta = fs::metadata(&root).map_err(unavailable)?;
        if !meta.is_dir() {
            return Err(unavailable(io::Error::other("not a directory")));
        }
        // Permission bits alone do not say whether this process may write.
        tempfile::Builder::new()
            .prefix(".luft-write-check")
            .tempfile_in(&root)
            .map_err(unavailable)?;

        telemetry.in_scope(|| debug!(root = %root.display(), "archive root ready"));
        Ok(Self { root, telemetry })
    }

    /// The archive root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The logging handle this store writes to.
    pub fn telemetry(&self) -> &Telemetry {
        &self.telemetry
    }

    /// The identifier an archive of `source` written at `at` would get.
    pub fn identifier_for(&self, source: &SourceName, at: &ArchiveTimestamp) -> ArchiveId {
        ArchiveId::for_partition(&self.root, source, at)
    }

    /// Archive `data` under `source`, stamped with the current UTC time.
    pub fn archive<T: ?Sized + Serialize>(
        &self,
        data: &T,
        source: &str,
        metadata: Metadata,
    ) -> Result<ArchiveId, ArchiveError> {
        self.archive_at(data, source, metadata, ArchiveTimestamp::now())
    }

    /// Archive `data` under `source` with an explicit `archived_at`.
    pub fn archive_at<T: ?Sized + Serialize>(
        &self,
        data: &T,
        source: &str,
        metadata: Metadata,
        archived_at: ArchiveTimestamp,
    ) -> Result<ArchiveId, ArchiveError> {
        let source = SourceName::new(source)?;
        let id = self.identifier_for(&source, &archived_at);
        let write_error = |source: WriteFailure| ArchiveError::Write {
            path: id.as_path().to_path_buf(),
            source,
        };

        let data = serde_json::to_value(data).map_err(|e| write_error(WriteFailure::Encode(e)))?;
        let envelope = ArchiveEnvelope::seal(data, &source, metadata, archived_at)
            .map_err(|e| write_error(e.into()))?;
        let bytes = envelope
            .to_file_bytes()
            .map_err(|e| write_error(WriteFailure::Encode(e)))?;

        if let Some(partition) = id.as_path().parent() {
            fs::create_dir_all(partition).map_err(|e| write_error(e.into()))?;
        }

        let mut file = match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(id.as_path())
        {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                self.telemetry
                    .in_scope(|| warn!(archive = %id, "archive identifier already exists"));
                return Err(write_error(WriteFailure::AlreadyExists));
            }
            Err(e) => return Err(write_error(e.into())),
        };

        if let Err(e) = file.write_all(&bytes).and_then(|()| file.sync_all()) {
            drop(file);
            // Do not leave a truncated envelope behind.
            let _ = fs::remove_file(id.as_path());
            return Err(write_error(e.into()));
        }

        self.telemetry.in_scope(|| {
            info!(
                source = %source,
                archive = %id,
                checksum = %envelope.checksum,
                "archived snapshot"
            )
        });
        Ok(id)
    }

    /// Load an archive. A missing file is `Ok(None)`.
    pub fn retrieve(&self, id: &ArchiveId) -> Result<Option<ArchiveEnvelope>, ArchiveError> {
        let read_error = |source: ReadFailure| ArchiveError::Read {
            path: id.as_path().to_path_buf(),
            source,
        };

        let bytes = match fs::read(id.as_path()) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                self.telemetry
                    .in_scope(|| debug!(archive = %id, "archive not found"));
                return Ok(None);
            }
            Err(e) => return Err(read_error(e.into())),
        };

        let envelope = ArchiveEnvelope::from_file_bytes(&bytes)
            .map_err(|e| read_error(ReadFailure::Malformed(e)))?;
        Ok(Some(envelope))
    }

    /// Recompute the checksum of `envelope.data` and compare it with the
    /// stored value. Mismatch is `false`, never an error.
    pub fn verify_integrity(&self, envelope: &ArchiveEnvelope) -> bool {
        envelope.verify()
    }

    /// Enumerate archive identifiers for `source`.
    ///
    /// - Unknown source, or a name no archive could have been written
    ///   under: empty.
    /// - `date` given: the files directly inside that day's partition. A
    ///   `date` that is not `YYYY-MM-DD` yields an empty list and a warning.
    /// - `date` omitted: every archive of the source, recursively.
    ///
    /// Order is unspecified.
    pub fn list_archives(
        &self,
        source: &str,
        date: Option<&str>,
    ) -> Result<Vec<ArchiveId>, ArchiveError> {
        let source = match SourceName::new(source) {
            Ok(source) => source,
            Err(e) => {
                self.telemetry.in_scope(|| {
                    debug!(source, error = %e, "no partition can exist for source name")
                });
                return Ok(Vec::new());
            }
        };
        let source_root = self.root.join(source.as_str());
        if !source_root.is_dir() {
            return Ok(Vec::new());
        }

        match date {
            Some(raw) => {
                let date = match PartitionDate::parse(raw) {
                    Ok(date) => date,
                    Err(e) => {
                        self.telemetry.in_scope(|| {
                            warn!(source = %source, date = raw, error = %e, "ignoring archive listing with malformed date")
                        });
                        return Ok(Vec::new());
                    }
                };
                let [year, month, day] = date.segments();
                list_day(&source_root.join(year).join(month).join(day))
            }
            None => list_recursive(&source_root),
        }
    }

    /// The newest archive of `source`, by file name.
    pub fn latest(&self, source: &str) -> Result<Option<ArchiveId>, ArchiveError> {
        let ids = self.list_archives(source, None)?;
        Ok(ids
            .into_iter()
            .max_by(|a, b| a.file_name().cmp(&b.file_name())))
    }
}

fn list_day(day_dir: &Path) -> Result<Vec<ArchiveId>, ArchiveError> {
    let list_error = |source: io::Error| ArchiveError::List {
        path: day_dir.to_path_buf(),
        source,
    };
    let entries = match fs::read_dir(day_dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(list_error(e)),
    };

    let mut ids = Vec::new();
    for entry in entries {
        let entry = entry.map_err(list_error)?;
        let path = entry.path();
        if entry.file_type().map_err(list_error)?.is_file() && is_archive_file(&path) {
            ids.push(ArchiveId::new(path));
        }
    }
    Ok(ids)
}

fn list_recursive(source_root: &Path) -> Result<Vec<ArchiveId>, ArchiveError> {
    let mut ids = Vec::new();
    for entry in WalkDir::new(source_root) {
        let entry = entry.map_err(|e| ArchiveError::List {
            path: source_root.to_path_buf(),
            source: e.into(),
        })?;
        if entry.file_type().is_file() && is_archive_file(entry.path()) {
            ids.push(ArchiveId::new(entry.into_path()));
        }
    }
    Ok(ids)
}
