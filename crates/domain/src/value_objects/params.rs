//! Parsing rules for request parameters
//!
//! These functions operate on already-decoded string values. Lookup order
//! (route parameters first, then the query string) is the job of the HTTP
//! extractor; the rules here only decide how a raw value becomes a typed one.

use chrono::{DateTime, FixedOffset, NaiveDate};

use crate::errors::DomainError;
use crate::value_objects::SiteId;

/// Layout of compact dates such as `20240131`
pub const SHORT_DATE_FORMAT: &str = "%Y%m%d";

/// Values that always count as `true`, in addition to the standard literals
const TRUTHY: [&str; 5] = ["true", "yes", "1", "y", "\u{2713}"];

/// Parse a boolean parameter
///
/// `true`, `yes`, `1`, `y` and a check mark are truthy, as are the standard
/// boolean literals `t`, `T`, `TRUE` and `True`. Everything else, including
/// an empty value, is `false`.
pub fn parse_bool(value: &str) -> bool {
    if TRUTHY.contains(&value) {
        return true;
    }
    matches!(value, "t" | "T" | "TRUE" | "True")
}

/// Parse an integer parameter
pub fn parse_int(key: &str, value: &str) -> Result<i64, DomainError> {
    value
        .parse::<i64>()
        .map_err(|e| DomainError::invalid_parameter(key, format!("{value:?} is not an integer: {e}")))
}

/// Parse an integer parameter, falling back to `default` when missing or malformed
pub fn parse_int_or(value: Option<&str>, default: i64) -> i64 {
    match value {
        Some(v) if !v.is_empty() => v.parse().unwrap_or(default),
        _ => default,
    }
}

/// Parse a full RFC 3339 timestamp (fractional seconds allowed)
pub fn parse_timestamp(key: &str, value: &str) -> Result<DateTime<FixedOffset>, DomainError> {
    DateTime::parse_from_rfc3339(value)
        .map_err(|e| DomainError::invalid_parameter(key, format!("{value:?} is not a timestamp: {e}")))
}

/// Parse a compact eight-digit date (`YYYYMMDD`)
pub fn parse_short_date(key: &str, value: &str) -> Result<NaiveDate, DomainError> {
    if value.len() != 8 {
        return Err(DomainError::invalid_parameter(
            key,
            format!("{value:?} is not an eight digit date"),
        ));
    }
    NaiveDate::parse_from_str(value, SHORT_DATE_FORMAT)
        .map_err(|e| DomainError::invalid_parameter(key, format!("{value:?} is not a date: {e}")))
}

/// Parse every value of a repeated parameter as an integer
///
/// Fails on the first malformed value.
pub fn parse_ints<'a, I>(key: &str, values: I) -> Result<Vec<i64>, DomainError>
where
    I: IntoIterator<Item = &'a str>,
{
    values.into_iter().map(|v| parse_int(key, v)).collect()
}

/// Parse and validate a unique sortable identifier
pub fn parse_site_id(key: &str, value: &str) -> Result<SiteId, DomainError> {
    SiteId::parse(value).map_err(|e| DomainError::invalid_parameter(key, e.to_string()))
}

#[cfg(test)]
mod tests {
    use chrono::{Datelike, Timelike};

    use super::*;

    #[test]
    fn truthy_values_parse_to_true() {
        for value in ["true", "yes", "1", "y", "\u{2713}", "t", "T", "TRUE", "True"] {
            assert!(parse_bool(value), "{value} should be true");
        }
    }

    #[test]
    fn other_values_parse_to_false() {
        for value in ["", "false", "no", "0", "n", "maybe", "YES"] {
            assert!(!parse_bool(value), "{value} should be false");
        }
    }

    #[test]
    fn int_parses() {
        assert_eq!(parse_int("page", "42").unwrap(), 42);
        assert_eq!(parse_int("page", "-7").unwrap(), -7);
    }

    #[test]
    fn int_error_names_the_key() {
        let err = parse_int("page", "abc").unwrap_err();
        assert!(err.to_string().contains("page"));
    }

    #[test]
    fn int_or_returns_default_for_missing_and_malformed() {
        assert_eq!(parse_int_or(None, 10), 10);
        assert_eq!(parse_int_or(Some(""), 10), 10);
        assert_eq!(parse_int_or(Some("ten"), 10), 10);
        assert_eq!(parse_int_or(Some("3"), 10), 3);
    }

    #[test]
    fn timestamp_accepts_fractional_seconds() {
        let ts = parse_timestamp("at", "2024-03-01T10:15:30.123456789+02:00").unwrap();
        assert_eq!(ts.hour(), 10);
        assert_eq!(ts.nanosecond(), 123_456_789);
    }

    #[test]
    fn timestamp_rejects_plain_date() {
        assert!(parse_timestamp("at", "2024-03-01").is_err());
    }

    #[test]
    fn short_date_parses() {
        let date = parse_short_date("day", "20240131").unwrap();
        assert_eq!((date.year(), date.month(), date.day()), (2024, 1, 31));
    }

    #[test]
    fn short_date_rejects_other_layouts() {
        assert!(parse_short_date("day", "2024-01-31").is_err());
        assert!(parse_short_date("day", "20241331").is_err());
    }

    #[test]
    fn ints_fail_on_first_bad_value() {
        assert_eq!(parse_ints("id", ["1", "2", "3"]).unwrap(), vec![1, 2, 3]);
        assert!(parse_ints("id", ["1", "x"]).is_err());
    }

    #[test]
    fn site_id_is_validated() {
        assert!(parse_site_id("site", "01edg1d97awn9v0q87e4sj13c7").is_ok());
        assert!(parse_site_id("site", "not-a-ulid").is_err());
    }
}
