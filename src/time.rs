//! Date and timestamp helpers.
//!
//! All persisted dates are `YYYY-MM-DD` and all timestamps are local
//! `YYYY-MM-DD HH:MM:SS`, so SQLite's `date()` and plain string comparison both
//! order them correctly.

use chrono::{Duration, Local, NaiveDate, NaiveDateTime, NaiveTime};

use crate::error::{Error, Result};

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

pub fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

/// Current local time formatted for a `created_at` / `completed_at` column.
pub fn now_timestamp() -> String {
    now().format(DATETIME_FORMAT).to_string()
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub fn format_datetime(datetime: NaiveDateTime) -> String {
    datetime.format(DATETIME_FORMAT).to_string()
}

/// Parse a strict `YYYY-MM-DD` date.
pub fn parse_date(value: &str) -> Result<NaiveDate> {
    let trimmed = value.trim();
    if trimmed.len() != 10 {
        return Err(malformed_date(value));
    }
    NaiveDate::parse_from_str(trimmed, DATE_FORMAT).map_err(|_| malformed_date(value))
}

/// Parse an optional date, falling back to `default` when absent.
pub fn parse_date_or(value: Option<&str>, default: NaiveDate) -> Result<NaiveDate> {
    match value {
        Some(v) if !v.trim().is_empty() => parse_date(v),
        _ => Ok(default),
    }
}

/// Parse `YYYY-MM-DD HH:MM:SS`, or a bare `YYYY-MM-DD` at midnight.
pub fn parse_datetime(value: &str) -> Result<NaiveDateTime> {
    let trimmed = value.trim();
    if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, DATETIME_FORMAT) {
        return Ok(dt);
    }
    parse_date(trimmed)
        .map(|d| d.and_time(NaiveTime::MIN))
        .map_err(|_| {
            Error::validation(format!(
                "malformed datetime '{value}': expected YYYY-MM-DD HH:MM:SS"
            ))
        })
}

/// First day of the `days`-long window ending on `today` (inclusive).
pub fn window_start(today: NaiveDate, days: u32) -> NaiveDate {
    today - Duration::days(i64::from(days.saturating_sub(1)))
}

/// Text block the `current_time` tool hands to the agent so it can turn
/// "yesterday 3pm" into an absolute timestamp.
pub fn current_time_info(now: NaiveDateTime) -> String {
    let date = now.date();
    let yesterday = date.pred_opt().unwrap_or(date);
    let date_str = format_date(date);
    let yesterday_str = format_date(yesterday);
    let datetime_str = format_datetime(now);

    format!(
        "Current Time Information:\n\
         - Now: {datetime_str}\n\
         - Date: {date_str} ({weekday})\n\
         - Time: {time}\n\
         - Yesterday: {yesterday_str}\n\
         \n\
         Use this to convert relative time expressions:\n\
         - 'just now' -> {datetime_str}\n\
         - 'yesterday 3pm' -> {yesterday_str} 15:00:00\n\
         - 'this morning 9am' -> {date_str} 09:00:00",
        weekday = date.format("%A"),
        time = now.format("%H:%M:%S"),
    )
}

fn malformed_date(value: &str) -> Error {
    Error::validation(format!("malformed date '{value}': expected YYYY-MM-DD"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, DATE_FORMAT).unwrap()
    }

    #[test]
    fn parse_date_is_strict() {
        assert_eq!(parse_date("2024-01-15").unwrap(), d("2024-01-15"));
        assert!(parse_date("2024-1-15").is_err());
        assert!(parse_date("2024-02-30").is_err());
        assert!(parse_date("yesterday").is_err());
        let err = parse_date("15/01/2024").unwrap_err();
        assert_eq!(err.kind(), "validation");
    }

    #[test]
    fn parse_date_or_uses_default_for_blank() {
        let fallback = d("2024-03-01");
        assert_eq!(parse_date_or(None, fallback).unwrap(), fallback);
        assert_eq!(parse_date_or(Some("  "), fallback).unwrap(), fallback);
        assert_eq!(parse_date_or(Some("2024-01-02"), fallback).unwrap(), d("2024-01-02"));
    }

    #[test]
    fn parse_datetime_accepts_both_shapes() {
        let full = parse_datetime("2024-01-15 08:30:00").unwrap();
        assert_eq!(format_datetime(full), "2024-01-15 08:30:00");
        let bare = parse_datetime("2024-01-15").unwrap();
        assert_eq!(format_datetime(bare), "2024-01-15 00:00:00");
        assert!(parse_datetime("2024-01-15T08:30").is_err());
    }

    #[test]
    fn window_start_is_inclusive() {
        assert_eq!(window_start(d("2024-01-15"), 7), d("2024-01-09"));
        assert_eq!(window_start(d("2024-01-15"), 1), d("2024-01-15"));
        assert_eq!(window_start(d("2024-01-15"), 0), d("2024-01-15"));
    }

    #[test]
    fn current_time_info_handles_month_boundary() {
        let now = d("2024-03-01").and_hms_opt(10, 0, 0).unwrap();
        let info = current_time_info(now);
        assert!(info.contains("Date: 2024-03-01 (Friday)"));
        assert!(info.contains("Yesterday: 2024-02-29"));
    }
}
