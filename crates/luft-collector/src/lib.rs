//! # luft-collector -- Space-weather feed collectors
//!
//! Pulls real-time JSON feeds from the NOAA Space Weather Prediction Center
//! and bundles each polling cycle into a [`Snapshot`]:
//!
//! - **Solar wind** (`solar_wind`): RTSW wind, magnetic field and plasma.
//! - **Cosmic** (`cosmic`): GOES integral proton and electron flux, X-rays.
//!
//! Endpoint failures never abort a cycle; they are recorded per endpoint as
//! `{"status": "error", ...}` readings. Archiving is the caller's job, using
//! [`Collector::archive_metadata`] for the envelope metadata.

pub mod collector;
pub mod config;
pub mod error;
pub mod snapshot;

pub use collector::{Collector, CollectorKind};
pub use config::{CollectorConfig, ConfigError, Endpoint, DEFAULT_TIMEOUT_SECS};
pub use error::CollectorError;
pub use snapshot::{Snapshot, SourceReading};
