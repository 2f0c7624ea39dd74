//! `daybook://summary/...` resources.
//!
//! `today` and `weekly` are listed; any `daybook://summary/YYYY-MM-DD` can be
//! read even though it is not listed.

use chrono::NaiveDate;

use crate::db::Database;
use crate::diary::DiaryStore;
use crate::error::{Error, Result};
use crate::summary;
use crate::time;

pub const SUMMARY_PREFIX: &str = "daybook://summary/";
pub const TODAY_URI: &str = "daybook://summary/today";
pub const WEEKLY_URI: &str = "daybook://summary/weekly";

/// Listed resource: `(uri, name, description)`.
pub const LISTED: [(&str, &str, &str); 2] = [
    (
        TODAY_URI,
        "Today's Summary",
        "Finance, todos, health and diary activity for today",
    ),
    (
        WEEKLY_URI,
        "Weekly Summary",
        "Activity over the last seven days, including top expense categories",
    ),
];

/// Which digest a summary URI names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummaryTarget {
    Today,
    Weekly,
    Date(NaiveDate),
}

/// Parse a summary URI. Unknown URIs are [`Error::NotFound`].
pub fn parse_uri(uri: &str) -> Result<SummaryTarget> {
    let not_found = || Error::NotFound(format!("unknown resource: {uri}"));
    let rest = uri.strip_prefix(SUMMARY_PREFIX).ok_or_else(not_found)?;
    match rest {
        "today" => Ok(SummaryTarget::Today),
        "weekly" => Ok(SummaryTarget::Weekly),
        other => time::parse_date(other)
            .map(SummaryTarget::Date)
            .map_err(|_| not_found()),
    }
}

/// Render the digest behind `uri`.
pub fn read(uri: &str, db: &Database, diary: &DiaryStore, today: NaiveDate) -> Result<String> {
    let digest = match parse_uri(uri)? {
        SummaryTarget::Today => summary::daily(db, diary, today, today),
        SummaryTarget::Weekly => summary::weekly(db, diary, today),
        SummaryTarget::Date(date) => summary::daily(db, diary, date, today),
    };
    tracing::debug!(uri, "resource rendered");
    Ok(digest.render())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn parses_known_uris() {
        assert_eq!(parse_uri(TODAY_URI).unwrap(), SummaryTarget::Today);
        assert_eq!(parse_uri(WEEKLY_URI).unwrap(), SummaryTarget::Weekly);
        assert_eq!(
            parse_uri("daybook://summary/2024-01-15").unwrap(),
            SummaryTarget::Date(time::parse_date("2024-01-15").unwrap())
        );
    }

    #[test]
    fn unknown_uris_are_not_found() {
        for uri in [
            "daybook://summary/monthly",
            "daybook://summary/2024-13-01",
            "file:///etc/passwd",
            "",
        ] {
            assert_eq!(parse_uri(uri).unwrap_err().kind(), "not_found", "{uri}");
        }
    }

    #[test]
    fn reads_explicit_date_summary() {
        let dir = TempDir::new().unwrap();
        let db = Database::open_in_memory().unwrap();
        let diary = DiaryStore::open(dir.path()).unwrap();
        let today = time::parse_date("2024-02-01").unwrap();

        let text = read("daybook://summary/2024-01-15", &db, &diary, today).unwrap();
        assert!(text.starts_with("Daily Summary for 2024-01-15"));
        let weekly = read(WEEKLY_URI, &db, &diary, today).unwrap();
        assert!(weekly.starts_with("Weekly Summary (2024-01-26 to 2024-02-01)"));
    }
}
