//! # Config Subcommand
//!
//! Print the effective configuration, read one dotted key, or write a
//! default configuration file.

use anyhow::{Context as _, Result};
use clap::{Args, Subcommand};
use serde_json::Value;

use crate::config::LuftConfig;
use crate::Context;

/// Arguments for `luft config`.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Print the effective configuration, defaults included.
    Show {
        /// Print JSON instead of YAML.
        #[arg(long)]
        json: bool,
    },

    /// Print one value, e.g. `collectors.solar_wind.interval`.
    Get {
        key: String,
    },

    /// Write a default configuration file at the `--config` path.
    Init {
        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,
    },
}

/// Execute the config subcommand.
pub fn run_config(args: &ConfigArgs, ctx: &Context) -> Result<u8> {
    match &args.command {
        ConfigCommand::Show { json } => {
            let text = if *json {
                serde_json::to_string_pretty(&ctx.config)?
            } else {
                serde_yaml::to_string(&ctx.config)?
            };
            println!("{}", text.trim_end());
            Ok(0)
        }
        ConfigCommand::Get { key } => match ctx.config.lookup(key) {
            Some(Value::String(s)) => {
                println!("{s}");
                Ok(0)
            }
            Some(value) => {
                println!("{value}");
                Ok(0)
            }
            None => {
                println!("NOT FOUND: {key}");
                Ok(1)
            }
        },
        ConfigCommand::Init { force } => {
            let path = &ctx.config_path;
            if path.exists() && !force {
                println!(
                    "FAIL: {} already exists (use --force to overwrite)",
                    path.display()
                );
                return Ok(1);
            }
            LuftConfig::default()
                .save(path)
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!("OK: wrote {}", path.display());
            Ok(0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use luft_core::Telemetry;

    fn context(path: std::path::PathBuf) -> Context {
        Context {
            config: LuftConfig::default(),
            config_path: path,
            telemetry: Telemetry::disabled(),
        }
    }

    #[test]
    fn init_writes_defaults_and_refuses_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config/luft_config.yml");
        let ctx = context(path.clone());
        let init = |force| ConfigArgs {
            command: ConfigCommand::Init { force },
        };

        assert_eq!(run_config(&init(false), &ctx).unwrap(), 0);
        assert_eq!(LuftConfig::load(&path).unwrap(), LuftConfig::default());
        assert_eq!(run_config(&init(false), &ctx).unwrap(), 1);
        assert_eq!(run_config(&init(true), &ctx).unwrap(), 0);
    }

    #[test]
    fn get_missing_key_exits_one() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(dir.path().join("luft_config.yml"));
        let get = |key: &str| ConfigArgs {
            command: ConfigCommand::Get { key: key.into() },
        };
        assert_eq!(run_config(&get("logging.level"), &ctx).unwrap(), 0);
        assert_eq!(run_config(&get("logging.colour"), &ctx).unwrap(), 1);
    }
}
