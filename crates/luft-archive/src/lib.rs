//! # luft-archive — Archive Store
//!
//! Durable, content-verifiable, date-partitioned storage for space-weather
//! snapshots.
//!
//! ## Operations
//!
//! - [`ArchiveStore::open`] establishes the root directory.
//! - [`ArchiveStore::archive`] wraps data in an [`ArchiveEnvelope`],
//!   checksums it and writes `{root}/{source}/YYYY/MM/DD/{stamp}.json`.
//! - [`ArchiveStore::retrieve`] loads an envelope by [`ArchiveId`];
//!   a missing file is `Ok(None)`.
//! - [`ArchiveStore::verify_integrity`] recomputes the checksum.
//! - [`ArchiveStore::list_archives`] enumerates a source, optionally one day.
//!
//! Files are byte-compatible with archives written by the legacy Python
//! collectors, so existing archive trees can be listed and verified in place.

pub mod envelope;
pub mod error;
pub mod identifier;
pub mod store;

pub use envelope::{checksum_of, ArchiveEnvelope, Metadata, FORMAT_VERSION};
pub use error::{ArchiveError, ReadFailure, WriteFailure};
pub use identifier::{ArchiveId, ARCHIVE_EXTENSION};
pub use store::ArchiveStore;
