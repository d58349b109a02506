//! # Collection Snapshots
//!
//! One collection cycle produces one [`Snapshot`]: the cycle start time plus
//! a reading per endpoint. Readings are tagged by `status` so the archived
//! JSON reads:
//!
//! ```json
//! {"timestamp": "...", "sources": {
//!   "noaa_swpc": {"status": "success", "data": [...], "collected_at": "..."},
//!   "noaa_mag":  {"status": "error", "error": "...", "collected_at": "..."}
//! }}
//! ```
//!
//! `sources` keeps endpoints in the order they were polled.

use indexmap::IndexMap;
use luft_core::ArchiveTimestamp;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The outcome of polling one endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum SourceReading {
    /// The endpoint returned a JSON body.
    Success {
        data: Value,
        collected_at: ArchiveTimestamp,
    },
    /// The request failed; `error` is the rendered error message.
    Error {
        error: String,
        collected_at: ArchiveTimestamp,
    },
}

impl SourceReading {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn collected_at(&self) -> &ArchiveTimestamp {
        match self {
            Self::Success { collected_at, .. } | Self::Error { collected_at, .. } => collected_at,
        }
    }
}

/// Readings from every endpoint of one collector for one cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// When the cycle started.
    pub timestamp: ArchiveTimestamp,
    /// Endpoint name to reading, in polling order.
    pub sources: IndexMap<String, SourceReading>,
}

impl Snapshot {
    /// An empty snapshot stamped `timestamp`.
    pub fn new(timestamp: ArchiveTimestamp) -> Self {
        Self {
            timestamp,
            sources: IndexMap::new(),
        }
    }

    /// Record a reading, replacing any earlier one for `name` in place.
    pub fn record(&mut self, name: impl Into<String>, reading: SourceReading) {
        self.sources.insert(name.into(), reading);
    }

    pub fn reading(&self, name: &str) -> Option<&SourceReading> {
        self.sources.get(name)
    }

    pub fn success_count(&self) -> usize {
        self.sources.values().filter(|r| r.is_success()).count()
    }

    pub fn error_count(&self) -> usize {
        self.sources.len() - self.success_count()
    }

    /// True when at least one endpoint was polled and none succeeded.
    pub fn is_total_failure(&self) -> bool {
        !self.sources.is_empty() && self.success_count() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ts(s: &str) -> ArchiveTimestamp {
        ArchiveTimestamp::parse(s).unwrap()
    }

    #[test]
    fn serializes_with_status_tag() {
        let mut snap = Snapshot::new(ts("2024-03-07T13:45:00"));
        snap.record(
            "noaa_swpc",
            SourceReading::Success {
                data: json!([{"speed": 412.5}]),
                collected_at: ts("2024-03-07T13:45:00.5"),
            },
        );
        snap.record(
            "noaa_mag",
            SourceReading::Error {
                error: "timed out".into(),
                collected_at: ts("2024-03-07T13:45:30"),
            },
        );
        let value = serde_json::to_value(&snap).unwrap();
        assert_eq!(
            value,
            json!({
                "timestamp": "2024-03-07T13:45:00",
                "sources": {
                    "noaa_swpc": {"status": "success", "data": [{"speed": 412.5}], "collected_at": "2024-03-07T13:45:00.500000"},
                    "noaa_mag": {"status": "error", "error": "timed out", "collected_at": "2024-03-07T13:45:30"}
                }
            })
        );
    }

    #[test]
    fn sources_keep_polling_order() {
        let mut snap = Snapshot::new(ts("2024-03-07T13:45:00"));
        for name in ["noaa_swpc", "noaa_mag", "noaa_kp"] {
            snap.record(
                name,
                SourceReading::Error { error: "x".into(), collected_at: ts("2024-03-07T13:45:01") },
            );
        }
        snap.record(
            "noaa_mag",
            SourceReading::Success { data: json!([]), collected_at: ts("2024-03-07T13:45:02") },
        );
        let names: Vec<&str> = snap.sources.keys().map(String::as_str).collect();
        assert_eq!(names, ["noaa_swpc", "noaa_mag", "noaa_kp"]);

        let text = serde_json::to_string(&snap).unwrap();
        let swpc = text.find("noaa_swpc").unwrap();
        let mag = text.find("noaa_mag").unwrap();
        let kp = text.find("noaa_kp").unwrap();
        assert!(swpc < mag && mag < kp, "{text}");

        let back: Snapshot = serde_json::from_str(&text).unwrap();
        let names: Vec<&str> = back.sources.keys().map(String::as_str).collect();
        assert_eq!(names, ["noaa_swpc", "noaa_mag", "noaa_kp"]);
    }

    #[test]
    fn parses_archived_snapshot() {
        let value = json!({
            "timestamp": "2024-03-08T00:00:00",
            "sources": {
                "noaa_xray_flux": {"status": "success", "data": [], "collected_at": "2024-03-08T00:00:01.000250"}
            }
        });
        let snap: Snapshot = serde_json::from_value(value).unwrap();
        assert_eq!(snap.success_count(), 1);
        assert!(snap.reading("noaa_xray_flux").unwrap().is_success());
        assert_eq!(snap.reading("noaa_xray_flux").unwrap().collected_at().microsecond(), 250);
    }

    #[test]
    fn counts_and_total_failure() {
        let mut snap = Snapshot::new(ts("2024-03-07T00:00:00"));
        assert!(!snap.is_total_failure());
        snap.record(
            "a",
            SourceReading::Error { error: "x".into(), collected_at: ts("2024-03-07T00:00:01") },
        );
        assert!(snap.is_total_failure());
        snap.record(
            "b",
            SourceReading::Success { data: json!({}), collected_at: ts("2024-03-07T00:00:02") },
        );
        assert_eq!((snap.success_count(), snap.error_count()), (1, 1));
        assert!(!snap.is_total_failure());
    }
}
