//! # Temporal Types — Microsecond Archive Timestamps
//!
//! Defines `ArchiveTimestamp`, the UTC instant that names every archive
//! file, and `PartitionDate`, the `YYYY-MM-DD` day key used to filter
//! listings.
//!
//! ## Layout Invariant
//!
//! Archive identifiers are derived from the timestamp alone:
//!
//! - partition directories `YYYY/MM/DD`,
//! - file stem `YYYYMMDD_HHMMSS_ffffff` (six-digit microseconds).
//!
//! Both are pure functions of the instant, so sub-microsecond precision is
//! discarded at construction. Two timestamps that render to the same file
//! stem compare equal.
//!
//! ## Wire Format
//!
//! The envelope's `archived_at` field uses Python's naive
//! `datetime.isoformat()` form: `2024-03-07T13:45:00.123456`, with the
//! fractional part omitted entirely when the microsecond is zero and no
//! offset suffix. Parsing also accepts a trailing `Z` or `+00:00`; any other
//! offset is rejected.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Timelike, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::TimestampError;

/// A UTC instant truncated to microsecond precision.
///
/// # Construction
///
/// - [`ArchiveTimestamp::now()`] — current UTC time.
/// - [`ArchiveTimestamp::from_utc()`] — from a `DateTime<Utc>`.
/// - [`ArchiveTimestamp::parse()`] — from an isoformat string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ArchiveTimestamp(NaiveDateTime);

impl ArchiveTimestamp {
    /// The current UTC time, truncated to microseconds.
    pub fn now() -> Self {
        Self::from_utc(Utc::now())
    }

    /// Create a timestamp from a `chrono::DateTime<Utc>`, truncating
    /// below microseconds.
    pub fn from_utc(dt: DateTime<Utc>) -> Self {
        Self::from_naive_utc(dt.naive_utc())
    }

    /// Create a timestamp from a naive date-time that is already UTC.
    pub fn from_naive_utc(naive: NaiveDateTime) -> Self {
        Self(truncate_to_micros(naive))
    }

    /// Parse an isoformat timestamp (`YYYY-MM-DDTHH:MM:SS[.ffffff]`).
    ///
    /// A trailing `Z` or `+00:00` is tolerated. Fractions finer than a
    /// microsecond are truncated.
    ///
    /// # Errors
    ///
    /// Returns `TimestampError::InvalidTimestamp` for any other shape,
    /// including non-UTC offsets.
    pub fn parse(s: &str) -> Result<Self, TimestampError> {
        let body = s
            .strip_suffix('Z')
            .or_else(|| s.strip_suffix("+00:00"))
            .unwrap_or(s);
        let naive = NaiveDateTime::parse_from_str(body, "%Y-%m-%dT%H:%M:%S%.f").map_err(|e| {
            TimestampError::InvalidTimestamp {
                input: s.to_string(),
                reason: e.to_string(),
            }
        })?;
        Ok(Self::from_naive_utc(naive))
    }

    /// Access the inner naive UTC date-time.
    pub fn as_naive(&self) -> &NaiveDateTime {
        &self.0
    }

    /// The instant as a `DateTime<Utc>`.
    pub fn to_utc(&self) -> DateTime<Utc> {
        self.0.and_utc()
    }

    /// Microsecond component, `0..=999_999`.
    pub fn microsecond(&self) -> u32 {
        self.0.nanosecond() / 1_000
    }

    /// Render as Python's naive `datetime.isoformat()`.
    pub fn to_isoformat(&self) -> String {
        if self.microsecond() == 0 {
            self.0.format("%Y-%m-%dT%H:%M:%S").to_string()
        } else {
            self.0.format("%Y-%m-%dT%H:%M:%S%.6f").to_string()
        }
    }

    /// The archive file stem, `YYYYMMDD_HHMMSS_ffffff`.
    pub fn file_stem(&self) -> String {
        self.0.format("%Y%m%d_%H%M%S_%6f").to_string()
    }

    /// The day partition this instant falls into.
    pub fn partition_date(&self) -> PartitionDate {
        PartitionDate(self.0.date())
    }
}

impl fmt::Display for ArchiveTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_isoformat())
    }
}

impl FromStr for ArchiveTimestamp {
    type Err = TimestampError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for ArchiveTimestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_isoformat())
    }
}

impl<'de> Deserialize<'de> for ArchiveTimestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// A calendar day identifying one `YYYY/MM/DD` partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PartitionDate(NaiveDate);

impl PartitionDate {
    /// Wrap a calendar date.
    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    /// Parse strictly as `YYYY-MM-DD`: four-digit year, two-digit month
    /// and day, hyphen separated.
    pub fn parse(s: &str) -> Result<Self, TimestampError> {
        let invalid = || TimestampError::InvalidDate {
            input: s.to_string(),
        };
        let b = s.as_bytes();
        let shape_ok = b.len() == 10
            && b[4] == b'-'
            && b[7] == b'-'
            && b
                .iter()
                .enumerate()
                .all(|(i, c)| i == 4 || i == 7 || c.is_ascii_digit());
        if !shape_ok {
            return Err(invalid());
        }
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(Self)
            .map_err(|_| invalid())
    }

    /// Access the inner date.
    pub fn as_date(&self) -> &NaiveDate {
        &self.0
    }

    /// Directory segments `[YYYY, MM, DD]`, zero padded.
    pub fn segments(&self) -> [String; 3] {
        [
            self.0.format("%Y").to_string(),
            self.0.format("%m").to_string(),
            self.0.format("%d").to_string(),
        ]
    }
}

impl fmt::Display for PartitionDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

impl FromStr for PartitionDate {
    type Err = TimestampError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Discard everything below a microsecond.
fn truncate_to_micros(naive: NaiveDateTime) -> NaiveDateTime {
    let nanos = naive.nanosecond();
    naive.with_nanosecond(nanos - nanos % 1_000).unwrap_or(naive)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts(s: &str) -> ArchiveTimestamp {
        ArchiveTimestamp::parse(s).unwrap()
    }

    #[test]
    fn test_now_has_micro_precision() {
        let now = ArchiveTimestamp::now();
        assert_eq!(now.as_naive().nanosecond() % 1_000, 0);
    }

    #[test]
    fn test_from_utc_truncates_nanos() {
        let dt = Utc
            .with_ymd_and_hms(2024, 3, 7, 13, 45, 0)
            .unwrap()
            .with_nanosecond(123_456_789)
            .unwrap();
        let t = ArchiveTimestamp::from_utc(dt);
        assert_eq!(t.microsecond(), 123_456);
        assert_eq!(t.to_isoformat(), "2024-03-07T13:45:00.123456");
    }

    #[test]
    fn test_isoformat_omits_zero_fraction() {
        let t = ArchiveTimestamp::from_utc(Utc.with_ymd_and_hms(2024, 3, 7, 13, 45, 0).unwrap());
        assert_eq!(t.to_isoformat(), "2024-03-07T13:45:00");
    }

    #[test]
    fn test_isoformat_pads_small_fraction() {
        assert_eq!(ts("2024-03-07T13:45:00.000042").to_isoformat(), "2024-03-07T13:45:00.000042");
    }

    #[test]
    fn test_file_stem() {
        assert_eq!(ts("2024-03-07T13:45:00.123456").file_stem(), "20240307_134500_123456");
        assert_eq!(ts("2024-03-07T13:45:00").file_stem(), "20240307_134500_000000");
    }

    #[test]
    fn test_partition_date_segments() {
        let date = ts("2024-03-07T13:45:00.123456").partition_date();
        assert_eq!(date.segments(), ["2024".to_string(), "03".into(), "07".into()]);
        assert_eq!(date.to_string(), "2024-03-07");
    }

    #[test]
    fn test_parse_with_and_without_fraction() {
        assert_eq!(ts("2024-03-07T13:45:00").microsecond(), 0);
        assert_eq!(ts("2024-03-07T13:45:00.5").microsecond(), 500_000);
    }

    #[test]
    fn test_parse_tolerates_utc_suffixes() {
        let plain = ts("2024-03-07T13:45:00.123456");
        assert_eq!(ts("2024-03-07T13:45:00.123456Z"), plain);
        assert_eq!(ts("2024-03-07T13:45:00.123456+00:00"), plain);
    }

    #[test]
    fn test_parse_rejects_other_offsets() {
        assert!(ArchiveTimestamp::parse("2024-03-07T13:45:00+05:00").is_err());
        assert!(ArchiveTimestamp::parse("2024-03-07T13:45:00-04:00").is_err());
    }

    #[test]
    fn test_parse_invalid_format() {
        assert!(ArchiveTimestamp::parse("not-a-date").is_err());
        assert!(ArchiveTimestamp::parse("2024-03-07").is_err());
        assert!(ArchiveTimestamp::parse("").is_err());
    }

    #[test]
    fn test_ordering() {
        assert!(ts("2024-03-07T13:45:00.000001") > ts("2024-03-07T13:45:00"));
    }

    #[test]
    fn test_serde_roundtrip_uses_isoformat() {
        let t = ts("2024-03-07T13:45:00.123456");
        let json = serde_json::to_string(&t).unwrap();
        assert_eq!(json, "\"2024-03-07T13:45:00.123456\"");
        let back: ArchiveTimestamp = serde_json::from_str(&json).unwrap();
        assert_eq!(back, t);
    }

    #[test]
    fn test_partition_date_strict() {
        assert!(PartitionDate::parse("2024-03-07").is_ok());
        assert!(PartitionDate::parse("2024-3-7").is_err());
        assert!(PartitionDate::parse("2024/03/07").is_err());
        assert!(PartitionDate::parse("2024-02-30").is_err());
        assert!(PartitionDate::parse("20240307").is_err());
        assert!(PartitionDate::parse("+024-03-07").is_err());
        assert!(PartitionDate::parse("").is_err());
    }

    #[test]
    fn test_partition_date_from_str() {
        let date: PartitionDate = "2024-12-31".parse().unwrap();
        assert_eq!(date.segments(), ["2024".to_string(), "12".into(), "31".into()]);
    }
}
