//! # Archive Envelope
//!
//! The persisted unit: a snapshot wrapped with its format version, the time
//! it was archived, its source, caller metadata and a checksum.
//!
//! ## Integrity Invariant
//!
//! `checksum` is the lowercase hex SHA-256 of the canonical (key-sorted)
//! serialization of `data` alone. It is computed once in [`ArchiveEnvelope::seal`]
//! and never updated; [`ArchiveEnvelope::verify`] recomputes it and compares.
//!
//! ## File Layout
//!
//! Envelopes are written with a two-space indent and keys in the order
//! `version`, `archived_at`, `source`, `data`, `metadata`, `checksum`, with
//! no trailing newline. The key order inside `data` is kept as received.

use luft_core::{pyjson, sha256_hex, ArchiveTimestamp, CanonicalBytes, CanonicalizationError, SourceName};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Envelope format written by this crate.
pub const FORMAT_VERSION: &str = "1.0";

/// Open key/value annotations stored alongside the data.
pub type Metadata = Map<String, Value>;

/// A versioned, checksummed archive record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchiveEnvelope {
    /// Envelope format, `"1.0"`.
    #[serde(rename = "version")]
    pub format_version: String,
    /// When the envelope was created. Distinct from any timestamp in `data`.
    pub archived_at: ArchiveTimestamp,
    /// Data category, e.g. `solar_wind`.
    pub source: String,
    /// The archived snapshot, verbatim.
    pub data: Value,
    /// Caller annotations such as collector name and version.
    #[serde(default)]
    pub metadata: Metadata,
    /// Hex SHA-256 over the canonical form of `data`.
    pub checksum: String,
}

impl ArchiveEnvelope {
    /// Build an envelope and compute its checksum.
    pub fn seal(
        data: Value,
        source: &SourceName,
        metadata: Metadata,
        archived_at: ArchiveTimestamp,
    ) -> Result<Self, CanonicalizationError> {
        let checksum = checksum_of(&data)?;
        Ok(Self {
            format_version: FORMAT_VERSION.to_string(),
            archived_at,
            source: source.to_string(),
            data,
            metadata,
            checksum,
        })
    }

    /// Recompute the checksum over `data` and compare it with the stored one.
    ///
    /// Never errors: anything that prevents recomputation counts as a mismatch.
    pub fn verify(&self) -> bool {
        checksum_of(&self.data)
            .map(|actual| actual == self.checksum)
            .unwrap_or(false)
    }

    /// Encode for disk.
    pub fn to_file_bytes(&self) -> serde_json::Result<Vec<u8>> {
        pyjson::to_vec_pretty(self)
    }

    /// Decode from disk.
    pub fn from_file_bytes(bytes: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(bytes)
    }
}

/// The checksum an envelope holding `data` must carry.
pub fn checksum_of(data: &Value) -> Result<String, CanonicalizationError> {
    Ok(sha256_hex(&CanonicalBytes::from_value(data)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sealed(data: Value) -> ArchiveEnvelope {
        let source = SourceName::new("solar_wind").unwrap();
        let at = ArchiveTimestamp::parse("2024-03-07T13:45:00.123456").unwrap();
        let mut metadata = Metadata::new();
        metadata.insert("collector".into(), json!("SolarWindCollector"));
        ArchiveEnvelope::seal(data, &source, metadata, at).unwrap()
    }

    #[test]
    fn seal_sets_version_and_checksum() {
        let env = sealed(json!({"b": 2, "a": 1}));
        assert_eq!(env.format_version, "1.0");
        assert_eq!(env.source, "solar_wind");
        // hashlib.sha256(json.dumps({"a": 1, "b": 2}).encode()).hexdigest()
        assert_eq!(
            env.checksum,
            "d8497d9d82770a70729261095aa98f7ef5154d7af499f8037b6ca250296785a6"
        );
        assert!(env.verify());
    }

    #[test]
    fn verify_detects_leaf_change() {
        let mut env = sealed(json!({"sources": {"noaa_swpc": {"speed": 400.0}}}));
        assert!(env.verify());
        env.data["sources"]["noaa_swpc"]["speed"] = json!(400.5);
        assert!(!env.verify());
    }

    #[test]
    fn verify_ignores_metadata_changes() {
        let mut env = sealed(json!({"x": 1}));
        env.metadata.insert("note".into(), json!("edited"));
        assert!(env.verify());
    }

    #[test]
    fn verify_rejects_tampered_checksum() {
        let mut env = sealed(json!({"x": 1}));
        env.checksum = env.checksum.to_uppercase();
        assert!(!env.verify());
    }

    #[test]
    fn file_keys_in_fixed_order() {
        let env = sealed(json!({"z": 1, "a": 2}));
        let text = String::from_utf8(env.to_file_bytes().unwrap()).unwrap();
        let positions: Vec<usize> = ["\"version\"", "\"archived_at\"", "\"source\"", "\"data\"", "\"metadata\"", "\"checksum\""]
            .iter()
            .map(|k| text.find(k).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]), "{text}");
        // Data keeps insertion order on disk.
        assert!(text.find("\"z\"").unwrap() < text.find("\"a\"").unwrap());
        assert!(!text.ends_with('\n'));
    }

    #[test]
    fn file_roundtrip_preserves_envelope() {
        let env = sealed(json!({"speed": 412.5, "list": [1, 2.0, null]}));
        let back = ArchiveEnvelope::from_file_bytes(&env.to_file_bytes().unwrap()).unwrap();
        assert_eq!(back, env);
        assert!(back.verify());
    }

    #[test]
    fn integers_beyond_u64_verify_and_survive_rewrite() {
        // json.dumps({"n": 2**64}, sort_keys=True) hashed by the Python collectors.
        let text = r#"{"version": "1.0", "archived_at": "2024-03-07T13:45:00", "source": "cosmic", "data": {"n": 18446744073709551616}, "metadata": {}, "checksum": "d4a19f6278aac7e5b6def5d77b245978199fdecb850ff9e6a7a6529d74139fc8"}"#;
        let env = ArchiveEnvelope::from_file_bytes(text.as_bytes()).unwrap();
        assert!(env.verify());
        let rewritten = String::from_utf8(env.to_file_bytes().unwrap()).unwrap();
        assert!(rewritten.contains("\"n\": 18446744073709551616"));
    }

    #[test]
    fn missing_metadata_defaults_to_empty() {
        let text = r#"{"version": "1.0", "archived_at": "2024-03-07T13:45:00", "source": "cosmic", "data": {}, "checksum": "44136fa355b3678a1146ad16f7e8649e94fb4fc21fe77e8310c060f61caaff8a"}"#;
        let env = ArchiveEnvelope::from_file_bytes(text.as_bytes()).unwrap();
        assert!(env.metadata.is_empty());
        assert!(env.verify());
    }
}
