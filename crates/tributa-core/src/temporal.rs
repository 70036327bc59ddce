//! # Temporal Types — UTC-Only Timestamps
//!
//! Defines `Timestamp`, a UTC-only timestamp type truncated to seconds
//! precision. Maturity and due dates drive the time-compatibility
//! sub-score and the monetary-correction window, so their ordering must
//! be unambiguous: local timezone offsets would let the same instant
//! compare differently depending on the producer.
//!
//! Non-UTC inputs are **rejected at construction** by the strict parser —
//! there is no silent conversion that could introduce ambiguity. A
//! lenient parser exists for ingesting external fiscal data.

use chrono::{DateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::error::TributaError;

/// A UTC-only timestamp, truncated to seconds precision.
///
/// # Construction
///
/// - [`Timestamp::now()`] — current UTC time, truncated.
/// - [`Timestamp::from_utc()`] — from a `DateTime<Utc>`, truncating sub-seconds.
/// - [`Timestamp::parse()`] — from an ISO8601 string, rejecting non-UTC offsets.
/// - [`Timestamp::parse_lenient()`] — accepts any offset, converts to UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Create a timestamp from the current UTC time, truncated to seconds.
    pub fn now() -> Self {
        Self(truncate_to_seconds(Utc::now()))
    }

    /// Create a timestamp from a `chrono::DateTime<Utc>`, truncating sub-seconds.
    pub fn from_utc(dt: DateTime<Utc>) -> Self {
        Self(truncate_to_seconds(dt))
    }

    /// Parse a timestamp from an RFC 3339 / ISO8601 string.
    ///
    /// **Rejects non-UTC inputs.** Only timestamps with the `Z` suffix are
    /// accepted — even `+00:00`, which is semantically equivalent, is
    /// rejected so that stored representations stay canonical.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not valid RFC 3339 or uses a
    /// non-Z timezone offset.
    pub fn parse(s: &str) -> Result<Self, TributaError> {
        if !s.ends_with('Z') {
            return Err(TributaError::Temporal(format!(
                "timestamp must use Z suffix (UTC only), got: {s:?}"
            )));
        }

        let dt = DateTime::parse_from_rfc3339(s)
            .map_err(|e| TributaError::Temporal(format!("invalid RFC 3339 timestamp {s:?}: {e}")))?;

        Ok(Self(truncate_to_seconds(dt.with_timezone(&Utc))))
    }

    /// Parse a timestamp from an RFC 3339 string, accepting any timezone
    /// offset and converting to UTC.
    ///
    /// Lenient parser for ingesting external fiscal-authority data. The
    /// result is always UTC with seconds precision.
    pub fn parse_lenient(s: &str) -> Result<Self, TributaError> {
        let dt = DateTime::parse_from_rfc3339(s)
            .map_err(|e| TributaError::Temporal(format!("invalid RFC 3339 timestamp {s:?}: {e}")))?;
        Ok(Self(truncate_to_seconds(dt.with_timezone(&Utc))))
    }

    /// Access the inner `DateTime<Utc>`.
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Unix epoch timestamp in seconds.
    pub fn epoch_secs(&self) -> i64 {
        self.0.timestamp()
    }

    /// Whole days from `self` to `other`. Negative when `other` is earlier.
    ///
    /// Used for monetary-correction windows (maturity → due date) and the
    /// time-horizon constraint.
    pub fn days_until(&self, other: &Timestamp) -> i64 {
        (other.0 - self.0).num_days()
    }

    /// Render as ISO8601 with Z suffix (e.g., `2026-01-15T12:00:00Z`).
    pub fn to_iso8601(&self) -> String {
        self.0.format("%Y-%m-%dT%H:%M:%SZ").to_string()
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_iso8601())
    }
}

/// Truncate a `DateTime<Utc>` to seconds precision (discard nanoseconds).
fn truncate_to_seconds(dt: DateTime<Utc>) -> DateTime<Utc> {
    dt.with_nanosecond(0).unwrap_or(dt)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn now_has_no_subseconds() {
        assert_eq!(Timestamp::now().as_datetime().nanosecond(), 0);
    }

    #[test]
    fn parse_z_suffix_accepted() {
        let ts = Timestamp::parse("2026-03-15T12:00:00Z").unwrap();
        assert_eq!(ts.to_iso8601(), "2026-03-15T12:00:00Z");
    }

    #[test]
    fn parse_plus_zero_rejected() {
        assert!(Timestamp::parse("2026-03-15T12:00:00+00:00").is_err());
    }

    #[test]
    fn parse_offset_rejected() {
        assert!(Timestamp::parse("2026-03-15T09:00:00-03:00").is_err());
    }

    #[test]
    fn parse_subseconds_truncated() {
        let ts = Timestamp::parse("2026-03-15T12:00:00.987654Z").unwrap();
        assert_eq!(ts.as_datetime().nanosecond(), 0);
    }

    #[test]
    fn parse_invalid_format() {
        assert!(Timestamp::parse("not-a-date").is_err());
        assert!(Timestamp::parse("2026-03-15").is_err());
        assert!(Timestamp::parse("").is_err());
    }

    #[test]
    fn parse_lenient_converts_offset() {
        let ts = Timestamp::parse_lenient("2026-03-15T09:00:00-03:00").unwrap();
        assert_eq!(ts.to_iso8601(), "2026-03-15T12:00:00Z");
    }

    #[test]
    fn days_until_sign_convention() {
        let earlier = Timestamp::parse("2026-01-01T00:00:00Z").unwrap();
        let later = Timestamp::parse("2026-01-31T00:00:00Z").unwrap();
        assert_eq!(earlier.days_until(&later), 30);
        assert_eq!(later.days_until(&earlier), -30);
        assert_eq!(earlier.days_until(&earlier), 0);
    }

    #[test]
    fn ordering() {
        let earlier = Timestamp::parse("2026-01-15T12:00:00Z").unwrap();
        let later = Timestamp::parse("2026-01-15T12:00:01Z").unwrap();
        assert!(earlier < later);
    }

    #[test]
    fn serde_roundtrip() {
        let ts = Timestamp::parse("2026-01-15T12:00:00Z").unwrap();
        let json = serde_json::to_string(&ts).unwrap();
        let back: Timestamp = serde_json::from_str(&json).unwrap();
        assert_eq!(ts, back);
    }

    #[test]
    fn display_matches_iso8601() {
        let ts = Timestamp::parse("2026-06-30T23:59:59Z").unwrap();
        assert_eq!(format!("{ts}"), ts.to_iso8601());
    }

    proptest::proptest! {
        /// `days_until` is antisymmetric for any pair of instants.
        #[test]
        fn days_until_antisymmetric(a in 0i64..4_000_000_000, b in 0i64..4_000_000_000) {
            let ta = Timestamp::from_utc(chrono::DateTime::from_timestamp(a, 0).unwrap());
            let tb = Timestamp::from_utc(chrono::DateTime::from_timestamp(b, 0).unwrap());
            proptest::prop_assert_eq!(ta.days_until(&tb), -tb.days_until(&ta));
        }
    }
}
