//! Collector error types.

use crate::config::ConfigError;

/// Errors from fetching a single endpoint.
///
/// A collection cycle never fails as a whole; these errors are recorded
/// per endpoint in the snapshot.
#[derive(Debug, thiserror::Error)]
pub enum CollectorError {
    /// HTTP transport error, including timeouts.
    #[error("HTTP error calling {endpoint}: {source}")]
    Http {
        endpoint: String,
        source: reqwest::Error,
    },
    /// The endpoint returned a non-2xx status.
    #[error("{endpoint} returned {status}: {body}")]
    ApiError {
        endpoint: String,
        status: u16,
        body: String,
    },
    /// The body was not valid JSON.
    #[error("failed to deserialize response from {endpoint}: {source}")]
    Deserialization {
        endpoint: String,
        source: reqwest::Error,
    },
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl CollectorError {
    /// The endpoint label the error concerns, if any.
    pub fn endpoint(&self) -> Option<&str> {
        match self {
            Self::Http { endpoint, .. }
            | Self::ApiError { endpoint, .. }
            | Self::Deserialization { endpoint, .. } => Some(endpoint),
            Self::Config(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_display_includes_status_and_body() {
        let err = CollectorError::ApiError {
            endpoint: "noaa_mag (GET http://x/mag.json)".into(),
            status: 503,
            body: "upstream unavailable".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("503"));
        assert!(msg.contains("upstream unavailable"));
        assert_eq!(err.endpoint(), Some("noaa_mag (GET http://x/mag.json)"));
    }

    #[test]
    fn config_error_has_no_endpoint() {
        let err = CollectorError::from(ConfigError::NoEndpoints("solar_wind".into()));
        assert_eq!(err.endpoint(), None);
    }
}
