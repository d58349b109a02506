//! # Archive Subcommand
//!
//! Read-only access to the archive: list identifiers, print an envelope,
//! verify checksums, find the newest archive of a source.
//!
//! Output lines follow the `OK:` / `FAIL:` / `NOT FOUND:` convention so
//! scripts can grep them; the exit code is 1 whenever anything asked for
//! was missing or failed verification.

use anyhow::{bail, Result};
use clap::{Args, Subcommand};
use luft_archive::{ArchiveId, ArchiveStore};

use crate::Context;

/// Arguments for `luft archive`.
#[derive(Args, Debug)]
pub struct ArchiveArgs {
    #[command(subcommand)]
    pub command: ArchiveCommand,
}

#[derive(Subcommand, Debug)]
pub enum ArchiveCommand {
    /// List archive identifiers for a source.
    List {
        /// Source name, e.g. "solar_wind" or "cosmic".
        source: String,
        /// Only this day (UTC).
        #[arg(long, value_name = "YYYY-MM-DD")]
        date: Option<String>,
        /// Sort chronologically.
        #[arg(long)]
        sorted: bool,
    },

    /// Print a stored envelope.
    Show {
        /// Archive identifier (file path).
        id: ArchiveId,
    },

    /// Recompute and compare checksums.
    Verify {
        /// One or more archive identifiers.
        #[arg(required = true)]
        ids: Vec<ArchiveId>,
    },

    /// Print the newest archive identifier for a source.
    Latest {
        source: String,
    },
}

/// Execute the archive subcommand.
pub fn run_archive(args: &ArchiveArgs, ctx: &Context) -> Result<u8> {
    let store = ctx.open_store()?;
    match &args.command {
        ArchiveCommand::List {
            source,
            date,
            sorted,
        } => cmd_list(&store, source, date.as_deref(), *sorted),
        ArchiveCommand::Show { id } => cmd_show(&store, id),
        ArchiveCommand::Verify { ids } => cmd_verify(&store, ids),
        ArchiveCommand::Latest { source } => cmd_latest(&store, source),
    }
}

fn cmd_list(store: &ArchiveStore, source: &str, date: Option<&str>, sorted: bool) -> Result<u8> {
    let mut ids = match store.list_archives(source, date) {
        Ok(ids) => ids,
        Err(e) => bail!("cannot list {source}: {e}"),
    };
    if sorted {
        ids.sort();
    }
    for id in &ids {
        println!("{id}");
    }
    Ok(0)
}

fn cmd_show(store: &ArchiveStore, id: &ArchiveId) -> Result<u8> {
    match store.retrieve(id) {
        Ok(Some(envelope)) => {
            let bytes = envelope.to_file_bytes()?;
            println!("{}", String::from_utf8_lossy(&bytes));
            Ok(0)
        }
        Ok(None) => {
            println!("NOT FOUND: {id}");
            Ok(1)
        }
        Err(e) => bail!("cannot read {id}: {e}"),
    }
}

fn cmd_verify(store: &ArchiveStore, ids: &[ArchiveId]) -> Result<u8> {
    let mut failures = 0usize;
    for id in ids {
        match store.retrieve(id) {
            Ok(Some(envelope)) if store.verify_integrity(&envelope) => {
                println!("OK: {id} checksum={}", envelope.checksum);
            }
            Ok(Some(_)) => {
                println!("FAIL: {id} checksum mismatch");
                failures += 1;
            }
            Ok(None) => {
                println!("NOT FOUND: {id}");
                failures += 1;
            }
            Err(e) => {
                println!("FAIL: {id}: {e}");
                failures += 1;
            }
        }
    }
    Ok(u8::from(failures > 0))
}

fn cmd_latest(store: &ArchiveStore, source: &str) -> Result<u8> {
    match store.latest(source) {
        Ok(Some(id)) => {
            println!("{id}");
            Ok(0)
        }
        Ok(None) => {
            println!("NOT FOUND: no archives for {source}");
            Ok(1)
        }
        Err(e) => bail!("cannot list {source}: {e}"),
    }
}
