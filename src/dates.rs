use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};

/// Naive datetime layouts, read as local wall-clock time.
const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
];

/// Timestamps with a short or colon-less offset, as databases and some
/// exporters print them (`2025-03-01 14:00:00+00`, `2025-03-01T14:00:00+0000`).
const OFFSET_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f%#z",
    "%Y-%m-%dT%H:%M:%S%.f%#z",
];

/// Parse a date-like string and return the local calendar day it falls on.
///
/// Accepts RFC 3339 (`2025-03-01T14:00:00Z`, `...-03:00`), database
/// timestamps with offsets, naive ISO datetimes, `YYYY-MM-DD`, and the
/// regional `DD/MM/YYYY` with or without a time of day. Offset-aware
/// values are converted to local time; naive values are taken as already
/// local. Returns `None` when nothing parses.
pub fn parse_local_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Local).date_naive());
    }
    for format in OFFSET_DATETIME_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(text, format) {
            return Some(dt.with_timezone(&Local).date_naive());
        }
    }
    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, format) {
            return Some(dt.date());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(date) = NaiveDate::parse_from_str(text, "%d/%m/%Y") {
        return Some(date);
    }
    None
}

/// Today's date in the process's local time zone.
pub fn local_today() -> NaiveDate {
    Local::now().date_naive()
}
