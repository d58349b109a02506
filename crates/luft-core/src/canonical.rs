//! # Canonical Serialization — Checksum Byte Production
//!
//! This module defines `CanonicalBytes`, the sole construction path for bytes
//! used in archive checksum computation.
//!
//! ## Integrity Invariant
//!
//! The `CanonicalBytes` newtype has a private inner field. The only way to
//! construct it is through `CanonicalBytes::new()` (or `from_value()`), which
//! sorts object keys at every depth before serializing. Any function that
//! hashes archive content must accept `&CanonicalBytes`, so the "hashed the
//! insertion-ordered bytes" defect cannot be written.
//!
//! ## Compatibility
//!
//! The byte sequence equals Python's `json.dumps(obj, sort_keys=True)`:
//!
//! 1. **Sorted keys** — lexicographic by Unicode code point, recursively.
//! 2. **Spaced separators** — `", "` between items, `": "` after keys.
//! 3. **ASCII only** — non-ASCII characters become `\uXXXX` escapes.
//! 4. **Python float repr** — `412.5`, `2.0`, `1e-05`, `1e+16`.
//!
//! Archives produced by the legacy Python collectors therefore verify unchanged.
//! See [`crate::pyjson`] for the formatting rules.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::CanonicalizationError;
use crate::pyjson;

/// Bytes produced exclusively by key-sorted, Python-compatible serialization.
///
/// # Invariants
///
/// - The only constructors are `CanonicalBytes::new()` and `from_value()`.
/// - Object keys are sorted at every nesting level.
/// - Output is ASCII; floats use Python's shortest repr.
///
/// These invariants cannot be violated by downstream code because the
/// inner `Vec<u8>` is private.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalBytes(Vec<u8>);

impl CanonicalBytes {
    /// Construct canonical bytes from any serializable value.
    ///
    /// # Errors
    ///
    /// Returns `CanonicalizationError::SerializationFailed` if the value
    /// cannot be represented as JSON (for example a map with non-string keys).
    pub fn new(obj: &impl Serialize) -> Result<Self, CanonicalizationError> {
        let value = serde_json::to_value(obj)?;
        Self::from_value(&value)
    }

    /// Construct canonical bytes from an already-built JSON tree.
    pub fn from_value(value: &Value) -> Result<Self, CanonicalizationError> {
        let sorted = sort_keys(value);
        Ok(Self(pyjson::to_vec(&sorted)?))
    }

    /// Access the canonical bytes for digest computation.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Returns the length of the canonical byte sequence.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the canonical byte sequence is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<[u8]> for CanonicalBytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Rebuild `value` with every object's keys in sorted order.
///
/// The workspace enables `serde_json/preserve_order` so archived data keeps
/// its upstream key order on disk; sorting is therefore explicit here rather
/// than inherited from a `BTreeMap`-backed `Map`.
fn sort_keys(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            let sorted: Map<String, Value> = entries
                .into_iter()
                .map(|(k, v)| (k.clone(), sort_keys(v)))
                .collect();
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.iter().map(sort_keys).collect()),
        other => other.clone(),
    }
}
