//! Collector configuration.
//!
//! Each collector polls a fixed list of named JSON endpoints. Defaults point
//! at the NOAA Space Weather Prediction Center real-time feeds; any endpoint
//! URL can be overridden by name, and extra endpoints can be appended.

use url::Url;

use crate::collector::CollectorKind;

/// Default per-request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Real-time solar wind feeds (speed/density, magnetic field, plasma).
pub const SOLAR_WIND_ENDPOINTS: &[(&str, &str)] = &[
    ("noaa_swpc", "https://services.swpc.noaa.gov/json/rtsw/rtsw_wind_1m.json"),
    ("noaa_mag", "https://services.swpc.noaa.gov/json/rtsw/rtsw_mag_1m.json"),
    ("noaa_plasma", "https://services.swpc.noaa.gov/json/rtsw/rtsw_plasma_1m.json"),
];

/// GOES integral particle flux and X-ray feeds, six-hour windows.
pub const COSMIC_ENDPOINTS: &[(&str, &str)] = &[
    (
        "noaa_proton_flux",
        "https://services.swpc.noaa.gov/json/goes/primary/integral-protons-plot-6-hour.json",
    ),
    (
        "noaa_electron_flux",
        "https://services.swpc.noaa.gov/json/goes/primary/integral-electrons-plot-6-hour.json",
    ),
    (
        "noaa_xray_flux",
        "https://services.swpc.noaa.gov/json/goes/primary/xrays-6-hour.json",
    ),
];

/// A named upstream JSON feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    /// Key under which the reading is stored in the snapshot.
    pub name: String,
    /// Absolute URL fetched with GET.
    pub url: Url,
}

impl Endpoint {
    /// Build an endpoint from a name and URL string.
    pub fn parse(name: impl Into<String>, url: &str) -> Result<Self, ConfigError> {
        let name = name.into();
        let url = Url::parse(url).map_err(|e| ConfigError::InvalidUrl(name.clone(), e.to_string()))?;
        Ok(Self { name, url })
    }

    /// Label used in logs and errors: `name (GET url)`.
    pub fn label(&self) -> String {
        format!("{} (GET {})", self.name, self.url)
    }
}

/// Settings for one collector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectorConfig {
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// Endpoints polled in order.
    pub endpoints: Vec<Endpoint>,
}

impl CollectorConfig {
    /// The built-in endpoints for `kind` with the default timeout.
    pub fn defaults_for(kind: CollectorKind) -> Result<Self, ConfigError> {
        let endpoints = kind
            .default_endpoints()
            .iter()
            .map(|(name, url)| Endpoint::parse(*name, url))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            endpoints,
        })
    }

    /// Replace the URL of endpoints with a matching name; append the rest.
    pub fn with_overrides<I>(mut self, overrides: I) -> Self
    where
        I: IntoIterator<Item = (String, Url)>,
    {
        for (name, url) in overrides {
            match self.endpoints.iter_mut().find(|e| e.name == name) {
                Some(existing) => existing.url = url,
                None => self.endpoints.push(Endpoint { name, url }),
            }
        }
        self
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Reject configurations a collector cannot run with.
    pub fn validate(&self, kind: CollectorKind) -> Result<(), ConfigError> {
        if self.endpoints.is_empty() {
            return Err(ConfigError::NoEndpoints(kind.archive_source().to_string()));
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout(kind.archive_source().to_string()));
        }
        Ok(())
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid URL for endpoint {0}: {1}")]
    InvalidUrl(String, String),
    #[error("collector {0} has no endpoints")]
    NoEndpoints(String),
    #[error("collector {0} has a zero request timeout")]
    ZeroTimeout(String),
}
