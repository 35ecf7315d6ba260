//! Post date normalization
//!
//! Front-matter dates arrive in several shapes. YAML has no distinct date type
//! once deserialized, so an unquoted `date: 2025-08-08` is recognised by its
//! timestamp shape and treated as a native calendar date, while anything else
//! textual goes through the ISO-8601 parser.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime};
use lazy_static::lazy_static;
use regex::Regex;
use serde_yaml::Value;

lazy_static! {
    /// YAML 1.1 `!!timestamp`, date-only form
    static ref YAML_DATE: Regex = Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap();
    /// YAML 1.1 `!!timestamp`, date and time form
    static ref YAML_DATETIME: Regex = Regex::new(
        r"^\d{4}-\d{1,2}-\d{1,2}(?:[Tt]|[ \t]+)\d{1,2}:\d{2}:\d{2}(?:\.\d*)?(?:[ \t]*Z|[-+]\d{1,2}(?::\d{2})?)?$"
    )
    .unwrap();
}

/// A raw `date` front-matter value, classified before normalization
#[derive(Debug, Clone, PartialEq)]
pub enum DateValue {
    /// Free-form text, parsed as ISO-8601
    Text(String),
    /// A calendar date without a time of day
    Date(NaiveDate),
    /// A complete date and time
    DateTime(NaiveDateTime),
    /// No date given
    Absent,
    /// Any other YAML value (number, bool, list, map)
    Other,
}

impl DateValue {
    /// Classify the `date` value from front-matter
    pub fn from_yaml(value: Option<&Value>) -> Self {
        match value {
            None | Some(Value::Null) => DateValue::Absent,
            Some(Value::String(s)) => Self::from_text(s),
            Some(Value::Tagged(tagged)) => Self::from_yaml(Some(&tagged.value)),
            Some(_) => DateValue::Other,
        }
    }

    fn from_text(s: &str) -> Self {
        let trimmed = s.trim();
        if YAML_DATE.is_match(trimmed) {
            if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
                return DateValue::Date(date);
            }
        } else if YAML_DATETIME.is_match(trimmed) {
            if let Some(dt) = parse_iso8601(trimmed) {
                return DateValue::DateTime(dt);
            }
        }
        DateValue::Text(s.to_string())
    }
}

/// Normalize a raw date to a local wall-clock timestamp.
///
/// Branches, in priority order:
/// 1. text is parsed as ISO-8601, falling back to `now`
/// 2. a calendar date becomes midnight of that day
/// 3. an absent date becomes `now`
/// 4. anything else becomes `now`
///
/// A complete date-time is kept as-is.
pub fn normalize_date(value: &DateValue, now: NaiveDateTime) -> NaiveDateTime {
    match value {
        DateValue::Text(s) => parse_iso8601(s).unwrap_or(now),
        DateValue::Date(date) => date.and_time(NaiveTime::MIN),
        DateValue::DateTime(dt) => *dt,
        DateValue::Absent => now,
        DateValue::Other => now,
    }
}

/// Parse an ISO-8601 date or date-time.
///
/// Values carrying a UTC offset are converted to local time.
pub fn parse_iso8601(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();

    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(date.and_time(NaiveTime::MIN));
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Local).naive_local());
    }

    let offset_formats = [
        "%Y-%m-%dT%H:%M:%S%.f%:z",
        "%Y-%m-%d %H:%M:%S%.f%:z",
        "%Y-%m-%dT%H:%M%:z",
        "%Y-%m-%d %H:%M%:z",
        "%Y-%m-%dT%H:%M:%S%.f%z",
        "%Y-%m-%d %H:%M:%S%.f%z",
    ];
    for fmt in offset_formats {
        if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
            return Some(dt.with_timezone(&Local).naive_local());
        }
    }

    let naive_formats = [
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M",
    ];
    for fmt in naive_formats {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2030, 1, 2)
            .unwrap()
            .and_hms_opt(3, 4, 5)
            .unwrap()
    }

    fn ymd_hms(y: i32, m: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, mi, s)
            .unwrap()
    }

    #[test]
    fn test_classify_yaml_values() {
        let date = Value::String("2025-08-08".to_string());
        assert_eq!(
            DateValue::from_yaml(Some(&date)),
            DateValue::Date(NaiveDate::from_ymd_opt(2025, 8, 8).unwrap())
        );

        let datetime = Value::String("2024-01-15 10:30:00".to_string());
        assert_eq!(
            DateValue::from_yaml(Some(&datetime)),
            DateValue::DateTime(ymd_hms(2024, 1, 15, 10, 30, 0))
        );

        let text = Value::String("last tuesday".to_string());
        assert_eq!(
            DateValue::from_yaml(Some(&text)),
            DateValue::Text("last tuesday".to_string())
        );

        assert_eq!(DateValue::from_yaml(None), DateValue::Absent);
        assert_eq!(DateValue::from_yaml(Some(&Value::Null)), DateValue::Absent);
        assert_eq!(
            DateValue::from_yaml(Some(&Value::Number(2025i64.into()))),
            DateValue::Other
        );
        assert_eq!(
            DateValue::from_yaml(Some(&Value::Bool(true))),
            DateValue::Other
        );
    }

    #[test]
    fn test_calendar_date_is_midnight() {
        let value = DateValue::Date(NaiveDate::from_ymd_opt(2025, 8, 6).unwrap());
        assert_eq!(normalize_date(&value, now()), ymd_hms(2025, 8, 6, 0, 0, 0));
    }

    #[test]
    fn test_native_datetime_keeps_time_of_day() {
        let raw = Value::String("2024-01-15 10:30:00".to_string());
        let value = DateValue::from_yaml(Some(&raw));
        assert_eq!(
            normalize_date(&value, now()),
            ymd_hms(2024, 1, 15, 10, 30, 0)
        );
    }

    #[test]
    fn test_text_parsed_as_iso() {
        let value = DateValue::Text("2025-08-07T14:15:16".to_string());
        assert_eq!(
            normalize_date(&value, now()),
            ymd_hms(2025, 8, 7, 14, 15, 16)
        );

        let value = DateValue::Text("2025-08-07 09:00".to_string());
        assert_eq!(normalize_date(&value, now()), ymd_hms(2025, 8, 7, 9, 0, 0));
    }

    #[test]
    fn test_fallbacks_use_now() {
        assert_eq!(
            normalize_date(&DateValue::Text("not a date".to_string()), now()),
            now()
        );
        assert_eq!(normalize_date(&DateValue::Absent, now()), now());
        assert_eq!(normalize_date(&DateValue::Other, now()), now());
    }

    #[test]
    fn test_offset_converted_to_local() {
        let expected = DateTime::parse_from_rfc3339("2025-08-08T12:00:00+02:00")
            .unwrap()
            .with_timezone(&Local)
            .naive_local();
        assert_eq!(parse_iso8601("2025-08-08T12:00:00+02:00"), Some(expected));

        let expected = DateTime::parse_from_rfc3339("2025-08-08T10:00:00Z")
            .unwrap()
            .with_timezone(&Local)
            .naive_local();
        assert_eq!(parse_iso8601("2025-08-08T10:00:00Z"), Some(expected));
    }

    #[test]
    fn test_invalid_calendar_values_rejected() {
        assert_eq!(parse_iso8601("2025-13-45"), None);
        assert_eq!(
            DateValue::from_yaml(Some(&Value::String("2025-02-30".to_string()))),
            DateValue::Text("2025-02-30".to_string())
        );
    }
}
