//! Lenient parsing of backend timestamps.
//!
//! `created_at` values may or may not carry a UTC offset depending on how the
//! row was stored. A naive timestamp is read as UTC.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer};

/// Parse an ISO-8601 timestamp, with or without an offset.
#[must_use]
pub fn parse(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

/// `serde(deserialize_with)` helper for optional timestamps.
///
/// Unparseable values become `None` rather than failing the whole record.
///
/// # Errors
///
/// Only fails if the value is neither a string nor null.
pub fn deserialize_option<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(parse))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{Datelike, Timelike};

    use super::*;

    #[test]
    fn test_parse_with_offset() {
        let dt = parse("2025-03-01T10:15:30.123456+00:00").unwrap();
        assert_eq!(dt.year(), 2025);
        assert_eq!(dt.hour(), 10);
    }

    #[test]
    fn test_parse_naive_as_utc() {
        let dt = parse("2025-03-01T10:15:30").unwrap();
        assert_eq!(dt.minute(), 15);
        let dt = parse("2025-03-01T10:15:30.5").unwrap();
        assert_eq!(dt.second(), 30);
    }

    #[test]
    fn test_parse_garbage() {
        assert!(parse("yesterday").is_none());
    }

    #[test]
    fn test_deserialize_option() {
        #[derive(Deserialize)]
        struct Row {
            #[serde(default, deserialize_with = "deserialize_option")]
            created_at: Option<DateTime<Utc>>,
        }

        let row: Row = serde_json::from_str(r#"{"created_at": "2025-01-02T03:04:05"}"#).unwrap();
        assert!(row.created_at.is_some());
        let row: Row = serde_json::from_str(r#"{"created_at": null}"#).unwrap();
        assert!(row.created_at.is_none());
        let row: Row = serde_json::from_str("{}").unwrap();
        assert!(row.created_at.is_none());
        let row: Row = serde_json::from_str(r#"{"created_at": "n/a"}"#).unwrap();
        assert!(row.created_at.is_none());
    }
}
