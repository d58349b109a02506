//! # Run Subcommand
//!
//! `luft run` collects and archives on a schedule until SIGINT or SIGTERM.
//! `luft run --once` runs a single cycle and exits 1 if every collector
//! failed.

use anyhow::Result;
use clap::Args;

use crate::runner::{spawn_shutdown_listener, Runner};
use crate::Context;

/// Arguments for `luft run`.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Run one collection cycle and exit.
    #[arg(long)]
    pub once: bool,
}

/// Execute the run subcommand.
pub fn run_run(args: &RunArgs, ctx: &Context) -> Result<u8> {
    let runner = Runner::from_config(&ctx.config, ctx.telemetry.clone())?;
    let runtime = crate::runtime()?;

    if args.once {
        let report = runtime.block_on(runner.run_once());
        for outcome in &report.outcomes {
            let status = if outcome.is_failure() { "FAIL" } else { "OK" };
            match &outcome.archive {
                Ok(id) => println!(
                    "{status}: {} {}/{} endpoints -> {id}",
                    outcome.kind,
                    outcome.succeeded,
                    outcome.succeeded + outcome.failed
                ),
                Err(e) => println!("FAIL: {}: {e}", outcome.kind),
            }
        }
        return Ok(u8::from(report.all_failed()));
    }

    runtime.block_on(async {
        let shutdown = spawn_shutdown_listener(ctx.telemetry.clone());
        runner.run_continuous(shutdown).await;
    });
    Ok(0)
}
