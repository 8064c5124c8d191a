//! Virtual-day arithmetic, timestamp parsing and duration formatting.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};

/// Format of a timestamp in the log file.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Returns the virtual day a timestamp belongs to.
///
/// Timestamps earlier than `virtual_midnight` count toward the previous
/// calendar date.
pub fn virtual_day(ts: NaiveDateTime, virtual_midnight: NaiveTime) -> NaiveDate {
    if ts.time() < virtual_midnight {
        ts.date() - Duration::days(1)
    } else {
        ts.date()
    }
}

/// Returns true if the two timestamps fall on different virtual days.
pub fn different_days(a: NaiveDateTime, b: NaiveDateTime, virtual_midnight: NaiveTime) -> bool {
    virtual_day(a, virtual_midnight) != virtual_day(b, virtual_midnight)
}

/// Parses a `YYYY-MM-DD HH:MM` timestamp.
///
/// Only the exact 16-character form is accepted.
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    let b = s.as_bytes();
    if b.len() != 16 || b[4] != b'-' || b[7] != b'-' || b[10] != b' ' || b[13] != b':' {
        return None;
    }
    NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT).ok()
}

/// Formats a timestamp the way it is written to the log file.
pub fn format_timestamp(ts: NaiveDateTime) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

/// Drops seconds and sub-second precision.
pub fn truncate_to_minute(ts: NaiveDateTime) -> NaiveDateTime {
    ts.with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(ts)
}

/// Formats a duration with minute precision, e.g. `"2 hours 5 min"`.
pub fn format_duration_long(d: Duration) -> String {
    let total = d.num_minutes().max(0);
    let (h, m) = (total / 60, total % 60);
    let plural = if h == 1 { "" } else { "s" };
    match (h, m) {
        (0, m) => format!("{m} min"),
        (h, 0) => format!("{h} hour{plural}"),
        (h, m) => format!("{h} hour{plural} {m} min"),
    }
}

/// Formats a duration as `H:MM`.
pub fn format_duration_short(d: Duration) -> String {
    let total = d.num_minutes().max(0);
    format!("{}:{:02}", total / 60, total % 60)
}

/// Whole minutes in a duration.
pub fn as_minutes(d: Duration) -> i64 {
    d.num_minutes()
}

/// Duration as decimal hours.
#[allow(clippy::cast_precision_loss)]
pub fn as_hours(d: Duration) -> f64 {
    d.num_seconds() as f64 / 3600.0
}

/// First day of the month containing `date`.
pub fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// First day of the month after the one containing `date`.
pub fn next_month(date: NaiveDate) -> NaiveDate {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(date)
}

/// Monday of the ISO week containing `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
}
