//! Lenient timestamp decoding.
//!
//! The backend sends RFC 3339 values, but `DateTime` columns without a kind
//! come back without an offset (`2026-03-01T08:30:00.1234567`). Those are
//! read as UTC. Use with `#[serde(deserialize_with = "...")]`.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer};

/// Parse an RFC 3339 or offset-less timestamp; offset-less values are UTC.
///
/// ```rust
/// use portal_client::timestamp::parse;
///
/// let with_offset = parse("2026-03-01T10:30:00+02:00").unwrap();
/// let naive = parse("2026-03-01T08:30:00").unwrap();
/// assert_eq!(with_offset, naive);
/// assert!(parse("yesterday").is_none());
/// ```
pub fn parse(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }

    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
        .map(|naive| naive.and_utc())
}

/// Required timestamp field.
pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
    let raw = String::deserialize(deserializer)?;
    parse(&raw).ok_or_else(|| D::Error::custom(format!("invalid timestamp '{}'", raw)))
}

/// Optional timestamp field; `null` and `""` read as `None`.
pub fn deserialize_option<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<DateTime<Utc>>, D::Error> {
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => parse(&raw)
            .map(Some)
            .ok_or_else(|| D::Error::custom(format!("invalid timestamp '{}'", raw))),
    }
}
