//! # luft-cli -- The `luft` command
//!
//! Runs the space-weather collectors on a schedule and inspects the archive
//! they produce.
//!
//! ## Subcommands
//!
//! - `luft run [--once]` -- collect and archive, once or until stopped.
//! - `luft collect <solar-wind|cosmic> [--archive]` -- one collector, one cycle.
//! - `luft archive list|show|verify|latest` -- read the archive.
//! - `luft config show|get|init` -- inspect or create the configuration file.
//!
//! ```bash
//! luft --config config/luft_config.yml run
//! luft archive list solar_wind --date 2024-03-07 --sorted
//! luft archive verify data/archive/cosmic/2024/03/08/20240308_000000_000000.json
//! ```

pub mod archive_cmd;
pub mod collect_cmd;
pub mod config;
pub mod config_cmd;
pub mod logging;
pub mod run_cmd;
pub mod runner;

use std::path::PathBuf;

use luft_archive::ArchiveStore;
use luft_core::Telemetry;

use crate::config::LuftConfig;

/// Everything a subcommand needs: the loaded configuration, where it came
/// from, and the logging handle.
#[derive(Debug, Clone)]
pub struct Context {
    pub config: LuftConfig,
    pub config_path: PathBuf,
    pub telemetry: Telemetry,
}

impl Context {
    /// Open the archive store named by `storage.archive_path`.
    pub fn open_store(&self) -> anyhow::Result<ArchiveStore> {
        ArchiveStore::open(&self.config.storage.archive_path, self.telemetry.clone()).map_err(|e| {
            anyhow::anyhow!("cannot open archive at {}: {e}", self.config.storage.archive_path.display())
        })
    }
}

/// A multi-threaded runtime for the async subcommands.
pub(crate) fn runtime() -> anyhow::Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| anyhow::anyhow!("failed to start async runtime: {e}"))
}
