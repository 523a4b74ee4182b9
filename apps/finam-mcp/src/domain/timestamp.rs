//! Timestamp Handling
//!
//! Callers pass ISO-8601 strings. A value with an explicit offset is
//! converted to UTC; a naive value is taken to already be UTC. Outbound
//! query parameters always carry an explicit `Z` suffix.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

const OFFSET_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f%z", "%Y-%m-%d %H:%M:%S%.f%z"];

/// Input was not an ISO-8601 date or date-time.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid ISO-8601 timestamp '{input}'")]
pub struct TimestampParseError {
    /// Rejected input.
    pub input: String,
}

/// Parse an ISO-8601 date or date-time, defaulting to UTC when no offset is given.
pub fn parse_timestamp(input: &str) -> Result<DateTime<Utc>, TimestampParseError> {
    let trimmed = input.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.with_timezone(&Utc));
    }

    for format in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(trimmed, format) {
            return Ok(dt.with_timezone(&Utc));
        }
    }

    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| TimestampParseError {
            input: input.to_string(),
        })
}

/// Encode a timestamp as RFC 3339 in UTC with a `Z` suffix.
#[must_use]
pub fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use test_case::test_case;

    use super::*;

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
    }

    #[test_case("2024-01-01T10:00:00Z" ; "zulu")]
    #[test_case("2024-01-01T10:00:00+00:00" ; "explicit zero offset")]
    #[test_case("2024-01-01T13:00:00+03:00" ; "moscow offset")]
    #[test_case("2024-01-01T13:00:00+0300" ; "offset without colon")]
    #[test_case("2024-01-01T10:00:00" ; "naive is utc")]
    #[test_case("2024-01-01 10:00:00" ; "space separator")]
    #[test_case("2024-01-01T10:00" ; "minutes precision")]
    fn parses_to_same_instant(input: &str) {
        assert_eq!(parse_timestamp(input).unwrap(), utc(2024, 1, 1, 10, 0, 0));
    }

    #[test]
    fn date_only_is_midnight_utc() {
        assert_eq!(
            parse_timestamp("2024-03-15").unwrap(),
            utc(2024, 3, 15, 0, 0, 0)
        );
    }

    #[test]
    fn fractional_seconds_survive() {
        let parsed = parse_timestamp("2024-01-01T10:00:00.250").unwrap();
        assert_eq!(parsed.timestamp_subsec_millis(), 250);
    }

    #[test_case("yesterday" ; "word")]
    #[test_case("2024-13-01T00:00:00Z" ; "bad month")]
    #[test_case("" ; "empty")]
    fn rejects_garbage(input: &str) {
        let err = parse_timestamp(input).unwrap_err();
        assert_eq!(err.input, input);
    }

    #[test]
    fn format_uses_zulu_suffix() {
        assert_eq!(
            format_timestamp(&utc(2024, 1, 31, 23, 59, 59)),
            "2024-01-31T23:59:59Z"
        );
    }
}
