//! # luft CLI entry point
//!
//! Parses arguments, loads the configuration file, builds the logging
//! handle and dispatches to the subcommand handlers. Handlers return the
//! process exit code; errors are logged and exit with 1.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use luft_cli::archive_cmd::{run_archive, ArchiveArgs};
use luft_cli::collect_cmd::{run_collect, CollectArgs};
use luft_cli::config::{LuftConfig, DEFAULT_CONFIG_PATH};
use luft_cli::config_cmd::{run_config, ConfigArgs, ConfigCommand};
use luft_cli::logging::telemetry_from;
use luft_cli::run_cmd::{run_run, RunArgs};
use luft_cli::Context;

/// LUFT space-weather archiver
///
/// Collects NOAA SWPC solar wind and cosmic particle feeds on a schedule
/// and stores each snapshot as a checksummed, date-partitioned JSON archive.
#[derive(Parser, Debug)]
#[command(name = "luft", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to configuration file (.yml, .yaml or .json).
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Collect and archive continuously, or once with --once.
    Run(RunArgs),

    /// Run one collector once and print endpoint status.
    Collect(CollectArgs),

    /// List, show, verify and find archives.
    Archive(ArchiveArgs),

    /// Inspect or create the configuration file.
    Config(ConfigArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match LuftConfig::load(&cli.config) {
        Ok(config) => config,
        // A broken file must not prevent writing a fresh one.
        Err(e) if matches!(&cli.command, Commands::Config(ConfigArgs { command: ConfigCommand::Init { .. } })) => {
            eprintln!("warning: ignoring unreadable configuration: {e}");
            LuftConfig::default()
        }
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::from(1);
        }
    };

    let telemetry = match telemetry_from(&config.logging, cli.verbose) {
        Ok(telemetry) => telemetry,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::from(1);
        }
    };

    let ctx = Context {
        config,
        config_path: cli.config,
        telemetry: telemetry.clone(),
    };

    telemetry.in_scope(|| {
        tracing::debug!(config = %ctx.config_path.display(), "luft starting");

        let result = match &cli.command {
            Commands::Run(args) => run_run(args, &ctx),
            Commands::Collect(args) => run_collect(args, &ctx),
            Commands::Archive(args) => run_archive(args, &ctx),
            Commands::Config(args) => run_config(args, &ctx),
        };

        match result {
            Ok(code) => ExitCode::from(code),
            Err(e) => {
                tracing::error!("{e:#}");
                ExitCode::from(1)
            }
        }
    })
}
