//! # Domain Identity Newtypes
//!
//! `SourceName` is the data-category key (`solar_wind`, `cosmic`) under
//! which archives are partitioned. It becomes the first directory segment
//! below the archive root, so it is validated once at construction and
//! carried as a distinct type afterwards.
//!
//! ## Path Safety Invariant
//!
//! A valid source name is a single path segment matching
//! `[A-Za-z0-9][A-Za-z0-9_-]{0,63}`. Separators, dots and empty names are
//! rejected, so a source can never escape the archive root.

use serde::{Deserialize, Serialize};

use crate::error::IdentityError;

/// Longest accepted source name.
pub const MAX_SOURCE_NAME_LEN: usize = 64;

/// A validated archive source key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SourceName(String);

impl SourceName {
    /// Validate and wrap a source name.
    pub fn new(value: impl Into<String>) -> Result<Self, IdentityError> {
        let value = value.into();
        let reject = |reason| IdentityError::InvalidSourceName {
            value: value.clone(),
            reason,
        };
        let first = match value.chars().next() {
            Some(c) => c,
            None => return Err(reject("must not be empty")),
        };
        if value.len() > MAX_SOURCE_NAME_LEN {
            return Err(reject("longer than 64 characters"));
        }
        if !first.is_ascii_alphanumeric() {
            return Err(reject("must start with an ASCII letter or digit"));
        }
        if !value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(reject("contains a character outside [A-Za-z0-9_-]"));
        }
        Ok(Self(value))
    }

    /// The name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for SourceName {
    type Error = IdentityError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for SourceName {
    type Error = IdentityError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<SourceName> for String {
    fn from(name: SourceName) -> Self {
        name.0
    }
}

impl AsRef<str> for SourceName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SourceName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
