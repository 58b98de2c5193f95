//! Lenient timestamp parsing for store documents.
//!
//! Shelter exports carry timestamps in whatever shape the import job produced:
//! ISO strings with or without offsets, US-style `MM/DD/YYYY hh:mm:ss AM`, bare
//! dates, or the store's extended-JSON `{"$date": ...}` wrapper.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::Value;

/// Canonical text rendering, also used to derive year buckets.
pub const RENDER_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %I:%M:%S %p",
    "%m/%d/%Y %I:%M %p",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y"];

/// Parses a timestamp string; offsets are normalised to UTC.
pub fn parse_timestamp(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.naive_utc());
    }

    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

/// Parses a raw document value: text, or `{"$date": text | millis}`.
pub fn parse_timestamp_value(value: &Value) -> Option<NaiveDateTime> {
    match value {
        Value::String(text) => parse_timestamp(text),
        Value::Object(map) => match map.get("$date")? {
            Value::String(text) => parse_timestamp(text),
            Value::Number(millis) => millis
                .as_i64()
                .and_then(DateTime::from_timestamp_millis)
                .map(|dt| dt.naive_utc()),
            Value::Object(inner) => inner
                .get("$numberLong")
                .and_then(Value::as_str)
                .and_then(|s| s.parse::<i64>().ok())
                .and_then(DateTime::from_timestamp_millis)
                .map(|dt| dt.naive_utc()),
            _ => None,
        },
        _ => None,
    }
}

pub fn render_timestamp(ts: &NaiveDateTime) -> String {
    ts.format(RENDER_FORMAT).to_string()
}
