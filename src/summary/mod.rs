//! Cross-record digests for a day or a date range.
//!
//! A [`Digest`] is assembled from four independently collected sections.
//! When one section fails (missing table, unreadable diary directory) it logs
//! a warning and falls back to its empty value, so a digest is always
//! produced.

mod render;

use chrono::NaiveDate;
use serde::Serialize;

use crate::db::Database;
use crate::diary::{DiaryEntry, DiaryStore};
use crate::error::Result;
use crate::records::finance::{self, CategoryTotal, FinanceTotals};
use crate::records::health::{self, MetricStats};
use crate::records::todo::{self, TodoCounts};
use crate::records::HealthRecord;
use crate::time;

/// Days covered by the weekly digest, today included.
pub const WEEKLY_DAYS: u32 = 7;
const TOP_CATEGORY_LIMIT: usize = 5;
const DIARY_PREVIEW_LIMIT: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Period {
    Day { date: NaiveDate },
    Range { start: NaiveDate, end: NaiveDate },
}

impl Period {
    pub fn start(&self) -> NaiveDate {
        match *self {
            Self::Day { date } => date,
            Self::Range { start, .. } => start,
        }
    }

    pub fn end(&self) -> NaiveDate {
        match *self {
            Self::Day { date } => date,
            Self::Range { end, .. } => end,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct FinanceSection {
    pub totals: FinanceTotals,
    /// Only collected for ranges.
    pub top_categories: Vec<CategoryTotal>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct HealthSection {
    pub latest: Vec<HealthRecord>,
    /// Only collected for ranges.
    pub stats: Vec<MetricStats>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct DiarySection {
    pub entry_count: usize,
    /// First few entries; only collected for single days.
    pub previews: Vec<DiaryEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Digest {
    pub period: Period,
    pub finance: FinanceSection,
    pub todos: TodoCounts,
    pub health: HealthSection,
    pub diary: DiarySection,
}

impl Digest {
    pub fn render(&self) -> String {
        render::render(self)
    }
}

/// Digest for a single date. `today` decides which pending todos are overdue.
pub fn daily(db: &Database, diary: &DiaryStore, date: NaiveDate, today: NaiveDate) -> Digest {
    collect(db, diary, Period::Day { date }, today)
}

/// Digest for the seven days ending today.
pub fn weekly(db: &Database, diary: &DiaryStore, today: NaiveDate) -> Digest {
    for_range(db, diary, time::window_start(today, WEEKLY_DAYS), today, today)
}

/// Digest for an explicit inclusive range.
pub fn for_range(
    db: &Database,
    diary: &DiaryStore,
    start: NaiveDate,
    end: NaiveDate,
    today: NaiveDate,
) -> Digest {
    collect(db, diary, Period::Range { start, end }, today)
}

fn collect(db: &Database, diary: &DiaryStore, period: Period, today: NaiveDate) -> Digest {
    let (start, end) = (period.start(), period.end());
    let is_range = matches!(period, Period::Range { .. });

    let finance = section("finance", || {
        let totals = finance::totals(db, start, end)?;
        let top_categories = if is_range {
            finance::top_categories(db, start, end, TOP_CATEGORY_LIMIT)?
        } else {
            Vec::new()
        };
        Ok(FinanceSection {
            totals,
            top_categories,
        })
    });

    let todos = section("todos", || todo::status_counts(db, start, end, today));

    let health = section("health", || {
        let latest = health::latest_per_metric(db, start, end)?;
        let stats = if is_range {
            health::range_stats(db, start, end)?
        } else {
            Vec::new()
        };
        Ok(HealthSection { latest, stats })
    });

    let diary = section("diary", || {
        let scan = diary.read_range(start, end)?;
        let previews: Vec<DiaryEntry> = if is_range {
            Vec::new()
        } else {
            scan.clone().take(DIARY_PREVIEW_LIMIT).map(|(_, e)| e).collect()
        };
        let entry_count = scan.count();
        Ok(DiarySection {
            entry_count,
            previews,
        })
    });

    tracing::debug!(%start, %end, "digest collected");
    Digest {
        period,
        finance,
        todos,
        health,
        diary,
    }
}

fn section<T: Default>(name: &str, collect: impl FnOnce() -> Result<T>) -> T {
    collect().unwrap_or_else(|e| {
        tracing::warn!(section = name, error = %e, "summary section unavailable");
        T::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::finance::NewExpense;
    use tempfile::TempDir;

    fn d(s: &str) -> NaiveDate {
        time::parse_date(s).unwrap()
    }

    fn fixture() -> (TempDir, Database, DiaryStore) {
        let dir = TempDir::new().unwrap();
        let diary = DiaryStore::open(dir.path().join("diary")).unwrap();
        (dir, Database::open_in_memory().unwrap(), diary)
    }

    #[test]
    fn empty_day_renders_all_sections() {
        let (_dir, db, diary) = fixture();
        let digest = daily(&db, &diary, d("2024-01-15"), d("2024-01-15"));
        assert_eq!(digest.finance.totals, FinanceTotals::default());
        assert_eq!(digest.diary.entry_count, 0);

        let text = digest.render();
        let finance = text.find("Finance").unwrap();
        let todos = text.find("Todos").unwrap();
        let health = text.find("Health").unwrap();
        let diary_pos = text.find("Diary").unwrap();
        assert!(finance < todos && todos < health && health < diary_pos);
    }

    #[test]
    fn digest_serializes_with_tagged_period() {
        let (_dir, db, diary) = fixture();
        crate::records::finance::record_expense(
            &db,
            NewExpense {
                amount: 12.5,
                category: "coffee".into(),
                note: None,
                date: Some(d("2024-01-15")),
            },
        )
        .unwrap();

        let json = serde_json::to_value(daily(&db, &diary, d("2024-01-15"), d("2024-01-15"))).unwrap();
        assert_eq!(json["period"]["kind"], "day");
        assert_eq!(json["period"]["date"], "2024-01-15");
        assert_eq!(json["finance"]["totals"]["expense_total"], 12.5);
        assert_eq!(json["todos"]["overdue"], 0);
        assert_eq!(json["diary"]["entry_count"], 0);

        let weekly = serde_json::to_value(weekly(&db, &diary, d("2024-01-15"))).unwrap();
        assert_eq!(weekly["period"]["kind"], "range");
        assert_eq!(weekly["period"]["start"], "2024-01-09");
    }

    #[test]
    fn weekly_window_is_seven_days() {
        let (_dir, db, diary) = fixture();
        let digest = weekly(&db, &diary, d("2024-01-15"));
        assert_eq!(digest.period, Period::Range { start: d("2024-01-09"), end: d("2024-01-15") });
        assert!(digest.render().starts_with("Weekly Summary (2024-01-09 to 2024-01-15)"));
    }

    #[test]
    fn range_collects_top_categories_and_previews_only_for_days() {
        let (_dir, db, diary) = fixture();
        for (amount, category) in [(35.0, "lunch"), (68.0, "books")] {
            finance::record_expense(
                &db,
                NewExpense {
                    amount,
                    category: category.into(),
                    note: None,
                    date: Some(d("2024-01-15")),
                },
            )
            .unwrap();
        }
        for i in 0..4 {
            diary.append(d("2024-01-15"), &format!("entry {i}"), vec![]).unwrap();
        }

        let day = daily(&db, &diary, d("2024-01-15"), d("2024-01-15"));
        assert!(day.finance.top_categories.is_empty());
        assert_eq!(day.diary.entry_count, 4);
        assert_eq!(day.diary.previews.len(), 3);

        let week = weekly(&db, &diary, d("2024-01-15"));
        assert_eq!(week.finance.top_categories[0].category, "books");
        assert_eq!(week.diary.entry_count, 4);
        assert!(week.diary.previews.is_empty());
    }
}
