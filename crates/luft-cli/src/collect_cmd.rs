//! # Collect Subcommand
//!
//! Poll one collector once and print the status of each endpoint. With
//! `--archive` the snapshot is also written to the archive.

use anyhow::{Context as _, Result};
use clap::{Args, ValueEnum};
use luft_collector::{Collector, CollectorKind, SourceReading};

use crate::Context;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CollectorChoice {
    SolarWind,
    Cosmic,
}

impl From<CollectorChoice> for CollectorKind {
    fn from(choice: CollectorChoice) -> Self {
        match choice {
            CollectorChoice::SolarWind => CollectorKind::SolarWind,
            CollectorChoice::Cosmic => CollectorKind::Cosmic,
        }
    }
}

/// Arguments for `luft collect`.
#[derive(Args, Debug)]
pub struct CollectArgs {
    /// Which collector to run.
    #[arg(value_enum)]
    pub collector: CollectorChoice,

    /// Archive the snapshot after collecting.
    #[arg(long)]
    pub archive: bool,
}

/// Execute the collect subcommand. Exits 1 when no endpoint answered.
pub fn run_collect(args: &CollectArgs, ctx: &Context) -> Result<u8> {
    let kind = CollectorKind::from(args.collector);
    let collector = Collector::new(kind, ctx.config.collector_config(kind)?, ctx.telemetry.clone())
        .with_context(|| format!("failed to build {kind} collector"))?;
    let store = if args.archive { Some(ctx.open_store()?) } else { None };

    let snapshot = crate::runtime()?.block_on(collector.collect_realtime_data());

    for (name, reading) in &snapshot.sources {
        match reading {
            SourceReading::Success { .. } => println!("OK: {name}"),
            SourceReading::Error { error, .. } => println!("FAIL: {name}: {error}"),
        }
    }

    if let Some(store) = store {
        let id = store
            .archive(&snapshot, kind.archive_source(), collector.archive_metadata())
            .with_context(|| format!("failed to archive {kind} snapshot"))?;
        println!("ARCHIVED: {id}");
    }

    Ok(u8::from(snapshot.is_total_failure()))
}
