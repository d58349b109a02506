//! # Configuration File
//!
//! Typed view of `config/luft_config.yml`. Every field has a default, so a
//! missing file or a partial one is valid. The file is read and validated
//! once at startup; components receive the typed sections they need.
//!
//! ```yaml
//! collectors:
//!   solar_wind:
//!     enabled: true
//!     interval: 300
//!     timeout: 30
//!     endpoints:
//!       noaa_mag: https://services.swpc.noaa.gov/json/rtsw/rtsw_mag_1m.json
//!   cosmic_data:
//!     enabled: true
//! storage:
//!   archive_path: data/archive
//!   cache_path: data/cache
//! logging:
//!   level: INFO
//!   file: logs/luft.log
//! ```
//!
//! JSON files with the same shape are accepted when the extension is `.json`.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use luft_collector::{CollectorConfig, CollectorKind};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

/// Default configuration file location.
pub const DEFAULT_CONFIG_PATH: &str = "config/luft_config.yml";

/// Errors loading, validating or saving configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read { path: PathBuf, source: io::Error },

    #[error("failed to parse {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("unsupported configuration format: {0} (expected .yml, .yaml or .json)")]
    UnsupportedFormat(PathBuf),

    #[error("invalid configuration: {0}")]
    Invalid(String),

    #[error("failed to write {path}: {source}")]
    Write { path: PathBuf, source: io::Error },

    #[error(transparent)]
    Collector(#[from] luft_collector::ConfigError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Yaml,
    Json,
}

impl Format {
    fn of(path: &Path) -> Result<Self, ConfigError> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("yml") | Some("yaml") => Ok(Self::Yaml),
            Some("json") => Ok(Self::Json),
            _ => Err(ConfigError::UnsupportedFormat(path.to_path_buf())),
        }
    }
}

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LuftConfig {
    pub collectors: CollectorsSection,
    pub storage: StorageSection,
    pub logging: LoggingSection,
}

/// The `collectors` section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectorsSection {
    pub solar_wind: CollectorSettings,
    pub cosmic_data: CollectorSettings,
}

/// Settings shared by both collectors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectorSettings {
    pub enabled: bool,
    /// Seconds between cycles.
    pub interval: u64,
    /// Per-request timeout in seconds.
    pub timeout: u64,
    /// Endpoint URL overrides and additions, by endpoint name.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub endpoints: BTreeMap<String, Url>,
}

impl Default for CollectorSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            interval: 300,
            timeout: luft_collector::DEFAULT_TIMEOUT_SECS,
            endpoints: BTreeMap::new(),
        }
    }
}

/// The `storage` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSection {
    pub archive_path: PathBuf,
    /// Pass-through key kept so existing config files load and save
    /// unchanged. Nothing reads it; no cache directory is created.
    pub cache_path: PathBuf,
}

impl Default for StorageSection {
    fn default() -> Self {
        Self {
            archive_path: PathBuf::from("data/archive"),
            cache_path: PathBuf::from("data/cache"),
        }
    }
}

/// The `logging` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    pub level: String,
    /// Log file appended to in addition to the console. `null` disables it.
    pub file: Option<PathBuf>,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "INFO".to_string(),
            file: Some(PathBuf::from("logs/luft.log")),
        }
    }
}

impl LuftConfig {
    /// Load from `path`, falling back to defaults when the file does not exist.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let format = Format::of(path)?;
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        let config = Self::parse(&text, format, path)?;
        config.validate()?;
        Ok(config)
    }

    fn parse(text: &str, format: Format, path: &Path) -> Result<Self, ConfigError> {
        let parse_error = |message: String| ConfigError::Parse {
            path: path.to_path_buf(),
            message,
        };
        match format {
            // An empty YAML document means "all defaults".
            Format::Yaml if text.trim().is_empty() => Ok(Self::default()),
            Format::Yaml => serde_yaml::from_str(text).map_err(|e| parse_error(e.to_string())),
            Format::Json => serde_json::from_str(text).map_err(|e| parse_error(e.to_string())),
        }
    }

    /// Check values the rest of the program relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for kind in CollectorKind::ALL {
            let settings = self.collector(kind);
            if settings.interval == 0 {
                return Err(ConfigError::Invalid(format!(
                    "collectors.{}.interval must be greater than zero",
                    kind.config_key()
                )));
            }
            if settings.timeout == 0 {
                return Err(ConfigError::Invalid(format!(
                    "collectors.{}.timeout must be greater than zero",
                    kind.config_key()
                )));
            }
        }
        if self.storage.archive_path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("storage.archive_path is empty".into()));
        }
        luft_core::telemetry::level_directive(&self.logging.level)
            .map_err(|e| ConfigError::Invalid(format!("logging.level: {e}")))?;
        Ok(())
    }

    /// Write the configuration as YAML or JSON, by extension.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let text = match Format::of(path)? {
            Format::Yaml => serde_yaml::to_string(self).map_err(|e| ConfigError::Invalid(e.to_string()))?,
            Format::Json => {
                serde_json::to_string_pretty(self).map_err(|e| ConfigError::Invalid(e.to_string()))?
            }
        };
        let write_error = |source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(write_error)?;
        }
        fs::write(path, text).map_err(write_error)
    }

    /// Settings for one collector.
    pub fn collector(&self, kind: CollectorKind) -> &CollectorSettings {
        match kind {
            CollectorKind::SolarWind => &self.collectors.solar_wind,
            CollectorKind::Cosmic => &self.collectors.cosmic_data,
        }
    }

    /// Built-in endpoints for `kind` with this file's timeout and overrides applied.
    pub fn collector_config(&self, kind: CollectorKind) -> Result<CollectorConfig, ConfigError> {
        let settings = self.collector(kind);
        Ok(CollectorConfig::defaults_for(kind)?
            .with_timeout(settings.timeout)
            .with_overrides(settings.endpoints.clone()))
    }

    /// Look up a dotted key such as `collectors.solar_wind.interval`.
    pub fn lookup(&self, key: &str) -> Option<Value> {
        let root = serde_json::to_value(self).ok()?;
        key.split('.')
            .try_fold(&root, |node, part| node.get(part))
            .cloned()
    }
}
