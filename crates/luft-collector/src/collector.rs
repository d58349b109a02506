//! # Collectors
//!
//! A [`Collector`] polls every configured endpoint of one [`CollectorKind`]
//! and folds the results into a [`Snapshot`]. Endpoints are polled one after
//! another; a failing endpoint is recorded in the snapshot and the cycle
//! carries on with the next one, so [`Collector::collect_realtime_data`]
//! itself never fails.

use std::time::Duration;

use luft_core::{ArchiveTimestamp, Telemetry};
use serde_json::{json, Map, Value};
use tracing::{debug, info, warn};

use crate::config::{CollectorConfig, Endpoint, COSMIC_ENDPOINTS, SOLAR_WIND_ENDPOINTS};
use crate::error::CollectorError;
use crate::snapshot::{Snapshot, SourceReading};

/// Which family of feeds a collector polls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollectorKind {
    /// Real-time solar wind: speed, density, magnetic field, plasma.
    SolarWind,
    /// GOES particle flux and X-ray measurements.
    Cosmic,
}

impl CollectorKind {
    pub const ALL: [CollectorKind; 2] = [CollectorKind::SolarWind, CollectorKind::Cosmic];

    /// Collector name recorded in archive metadata.
    pub fn name(&self) -> &'static str {
        match self {
            Self::SolarWind => "SolarWindCollector",
            Self::Cosmic => "CosmicDataCollector",
        }
    }

    /// Archive source the snapshots are stored under.
    pub fn archive_source(&self) -> &'static str {
        match self {
            Self::SolarWind => "solar_wind",
            Self::Cosmic => "cosmic",
        }
    }

    /// Section name under `collectors` in the configuration file.
    pub fn config_key(&self) -> &'static str {
        match self {
            Self::SolarWind => "solar_wind",
            Self::Cosmic => "cosmic_data",
        }
    }

    /// Built-in `(name, url)` endpoints.
    pub fn default_endpoints(&self) -> &'static [(&'static str, &'static str)] {
        match self {
            Self::SolarWind => SOLAR_WIND_ENDPOINTS,
            Self::Cosmic => COSMIC_ENDPOINTS,
        }
    }
}

impl std::fmt::Display for CollectorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.archive_source())
    }
}

/// Polls one family of endpoints.
#[derive(Debug, Clone)]
pub struct Collector {
    kind: CollectorKind,
    http: reqwest::Client,
    endpoints: Vec<Endpoint>,
    telemetry: Telemetry,
}

impl Collector {
    /// Create a collector from explicit configuration.
    pub fn new(
        kind: CollectorKind,
        config: CollectorConfig,
        telemetry: Telemetry,
    ) -> Result<Self, CollectorError> {
        config.validate(kind)?;
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("luft/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| CollectorError::Http {
                endpoint: "client_init".into(),
                source: e,
            })?;
        Ok(Self {
            kind,
            http,
            endpoints: config.endpoints,
            telemetry,
        })
    }

    /// A solar wind collector against the default NOAA feeds.
    pub fn solar_wind(telemetry: Telemetry) -> Result<Self, CollectorError> {
        Self::new(
            CollectorKind::SolarWind,
            CollectorConfig::defaults_for(CollectorKind::SolarWind)?,
            telemetry,
        )
    }

    /// A cosmic data collector against the default GOES feeds.
    pub fn cosmic(telemetry: Telemetry) -> Result<Self, CollectorError> {
        Self::new(
            CollectorKind::Cosmic,
            CollectorConfig::defaults_for(CollectorKind::Cosmic)?,
            telemetry,
        )
    }

    pub fn kind(&self) -> CollectorKind {
        self.kind
    }

    pub fn endpoints(&self) -> &[Endpoint] {
        &self.endpoints
    }

    /// GET one endpoint and decode its JSON body.
    pub async fn fetch(&self, endpoint: &Endpoint) -> Result<Value, CollectorError> {
        let label = endpoint.label();

        let resp = self
            .http
            .get(endpoint.url.clone())
            .send()
            .await
            .map_err(|e| CollectorError::Http {
                endpoint: label.clone(),
                source: e,
            })?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(CollectorError::ApiError {
                endpoint: label,
                status,
                body,
            });
        }

        resp.json()
            .await
            .map_err(|e| CollectorError::Deserialization {
                endpoint: label,
                source: e,
            })
    }

    /// Poll every endpoint once and return the combined snapshot.
    pub async fn collect_realtime_data(&self) -> Snapshot {
        self.telemetry.instrument(self.collect_inner()).await
    }

    async fn collect_inner(&self) -> Snapshot {
        let mut snapshot = Snapshot::new(ArchiveTimestamp::now());
        for endpoint in &self.endpoints {
            debug!(collector = %self.kind, endpoint = %endpoint.name, url = %endpoint.url, "polling");
            let reading = match self.fetch(endpoint).await {
                Ok(data) => SourceReading::Success {
                    data,
                    collected_at: ArchiveTimestamp::now(),
                },
                Err(e) => {
                    warn!(collector = %self.kind, endpoint = %endpoint.name, error = %e, "endpoint failed");
                    SourceReading::Error {
                        error: e.to_string(),
                        collected_at: ArchiveTimestamp::now(),
                    }
                }
            };
            snapshot.record(endpoint.name.clone(), reading);
        }
        info!(
            collector = %self.kind,
            succeeded = snapshot.success_count(),
            failed = snapshot.error_count(),
            "collection finished"
        );
        snapshot
    }

    /// Metadata stored alongside each archived snapshot.
    pub fn archive_metadata(&self) -> Map<String, Value> {
        let mut metadata = Map::new();
        metadata.insert("collector".into(), json!(self.kind.name()));
        metadata.insert("version".into(), json!(env!("CARGO_PKG_VERSION")));
        metadata
    }
}
