//! # luft-core — Foundational Types for the LUFT Archiver
//!
//! This crate defines the primitives every other LUFT crate builds on. It
//! depends on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **`CanonicalBytes` newtype.** All checksum computation flows through
//!    `CanonicalBytes::new()`, which sorts keys at every depth and renders
//!    JSON exactly as the legacy Python collectors did. No raw
//!    `serde_json::to_vec()` for checksums.
//!
//! 2. **`sha256_digest()` accepts only `&CanonicalBytes`.** Compile-time
//!    enforcement that every checksum covers canonical bytes.
//!
//! 3. **Microsecond UTC timestamps.** `ArchiveTimestamp` drops precision
//!    the file naming scheme cannot express, so identifiers and
//!    `archived_at` always agree.
//!
//! 4. **Validated source names.** `SourceName` guarantees a single safe path
//!    segment before any directory is created.
//!
//! 5. **Injected telemetry.** Logging is a `Telemetry` value handed to
//!    components, not ambient global state.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `luft-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod canonical;
pub mod digest;
pub mod error;
pub mod identity;
pub mod pyjson;
pub mod telemetry;
pub mod temporal;

// Re-export primary types for ergonomic imports.
pub use canonical::CanonicalBytes;
pub use digest::{sha256_digest, sha256_hex, ContentDigest};
pub use error::{CanonicalizationError, IdentityError, TelemetryError, TimestampError};
pub use identity::SourceName;
pub use telemetry::{LogCapture, LogFormat, Telemetry, TelemetryBuilder};
pub use temporal::{ArchiveTimestamp, PartitionDate};
