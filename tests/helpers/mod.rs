#![allow(dead_code)]

use chrono::NaiveDate;
use daybook::db::Database;
use daybook::diary::DiaryStore;
use tempfile::TempDir;

/// Open a fresh in-memory database with the schema applied.
pub fn test_db() -> Database {
    Database::open_in_memory().unwrap()
}

/// A diary store rooted in a temp directory. Keep the `TempDir` alive for the
/// duration of the test.
pub fn test_diary() -> (TempDir, DiaryStore) {
    let tmp = TempDir::new().unwrap();
    let diary = DiaryStore::open(tmp.path().join("diary")).unwrap();
    (tmp, diary)
}

/// Parse a `YYYY-MM-DD` literal.
pub fn date(s: &str) -> NaiveDate {
    daybook::time::parse_date(s).unwrap()
}
