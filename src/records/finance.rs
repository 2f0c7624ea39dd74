//! Expenses and income.

use chrono::NaiveDate;
use rusqlite::types::Value;
use rusqlite::{params, OptionalExtension};
use serde::Serialize;

use crate::db::{Database, QueryResult};
use crate::error::{Error, Result};
use crate::records::types::{parse_column, FinanceKind, FinanceRecord};
use crate::time;

const SELECT_COLUMNS: &str =
    "SELECT id, type, amount, category, source, note, date, created_at FROM finance";

#[derive(Debug, Clone, Default)]
pub struct NewExpense {
    pub amount: f64,
    pub category: String,
    pub note: Option<String>,
    /// Defaults to today.
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default)]
pub struct NewIncome {
    pub amount: f64,
    pub source: String,
    pub note: Option<String>,
    pub date: Option<NaiveDate>,
}

/// Structured alternative to raw SQL. Every field narrows the result.
#[derive(Debug, Clone, Default)]
pub struct FinanceFilter {
    pub kind: Option<FinanceKind>,
    /// Matched against `category` for expenses and `source` for income.
    pub category: Option<String>,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct FinanceTotals {
    pub expense_total: f64,
    pub expense_count: u32,
    pub income_total: f64,
    pub income_count: u32,
}

impl FinanceTotals {
    pub fn net(&self) -> f64 {
        self.income_total - self.expense_total
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTotal {
    pub category: String,
    pub total: f64,
    pub count: u32,
}

impl FinanceRecord {
    /// One-line acknowledgement handed back to the agent.
    pub fn confirmation(&self) -> String {
        let label = match self.kind {
            FinanceKind::Expense => self.category.as_deref(),
            FinanceKind::Income => self.source.as_deref(),
        }
        .unwrap_or("uncategorized");
        let mut line = format!(
            "Recorded {} #{} on {}: {:.2} ({label})",
            self.kind, self.id, self.date, self.amount
        );
        if let Some(note) = &self.note {
            line.push_str(&format!(" - {note}"));
        }
        line
    }
}

pub fn record_expense(db: &Database, expense: NewExpense) -> Result<FinanceRecord> {
    let category = required_label(&expense.category, "category")?;
    insert(
        db,
        FinanceKind::Expense,
        expense.amount,
        Some(category),
        None,
        expense.note.as_deref(),
        expense.date,
    )
}

pub fn record_income(db: &Database, income: NewIncome) -> Result<FinanceRecord> {
    let source = required_label(&income.source, "source")?;
    insert(
        db,
        FinanceKind::Income,
        income.amount,
        None,
        Some(source),
        income.note.as_deref(),
        income.date,
    )
}

fn insert(
    db: &Database,
    kind: FinanceKind,
    amount: f64,
    category: Option<&str>,
    source: Option<&str>,
    note: Option<&str>,
    date: Option<NaiveDate>,
) -> Result<FinanceRecord> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(Error::validation(format!(
            "amount must be a positive number, got {amount}"
        )));
    }
    let date = time::format_date(date.unwrap_or_else(time::today));
    let note = note.map(str::trim).filter(|n| !n.is_empty());

    let record = db.with_conn(|conn| {
        let id: i64 = conn.query_row(
            "INSERT INTO finance (type, amount, category, source, note, date, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7) RETURNING id",
            params![kind.as_str(), amount, category, source, note, date, time::now_timestamp()],
            |row| row.get(0),
        )?;
        conn.query_row(&format!("{SELECT_COLUMNS} WHERE id = ?1"), params![id], row_to_record)
    })?;
    tracing::info!(id = record.id, kind = %kind, amount, date = %record.date, "finance record stored");
    Ok(record)
}

fn required_label<'a>(value: &'a str, field: &str) -> Result<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Error::validation(format!("{field} must not be empty")));
    }
    Ok(trimmed)
}

pub fn get(db: &Database, id: i64) -> Result<Option<FinanceRecord>> {
    db.with_conn(|conn| {
        conn.query_row(
            &format!("{SELECT_COLUMNS} WHERE id = ?1"),
            params![id],
            row_to_record,
        )
        .optional()
    })
}

/// Agent-supplied read-only SQL over the `finance` table.
pub fn query(db: &Database, sql: &str) -> Result<QueryResult> {
    if !mentions_table(sql, "finance") {
        return Err(Error::invalid_query(sql, "query must target the finance table"));
    }
    db.query(sql, &[])
}

/// Records matching `filter`, newest date first.
pub fn list(db: &Database, filter: &FinanceFilter) -> Result<Vec<FinanceRecord>> {
    let mut sql = format!("{SELECT_COLUMNS} WHERE 1=1");
    let mut values: Vec<Value> = Vec::new();

    if let Some(kind) = filter.kind {
        values.push(Value::Text(kind.as_str().to_string()));
        sql.push_str(&format!(" AND type = ?{}", values.len()));
    }
    if let Some(label) = filter.category.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
        values.push(Value::Text(label.to_string()));
        let n = values.len();
        sql.push_str(&format!(" AND (category = ?{n} COLLATE NOCASE OR source = ?{n} COLLATE NOCASE)"));
    }
    if let Some(start) = filter.start {
        values.push(Value::Text(time::format_date(start)));
        sql.push_str(&format!(" AND date >= ?{}", values.len()));
    }
    if let Some(end) = filter.end {
        values.push(Value::Text(time::format_date(end)));
        sql.push_str(&format!(" AND date <= ?{}", values.len()));
    }
    sql.push_str(" ORDER BY date DESC, id DESC");

    db.with_conn(|conn| {
        let mut stmt = conn.prepare(&sql)?;
        let records = stmt
            .query_map(rusqlite::params_from_iter(values.iter()), row_to_record)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(records)
    })
}

/// Expense and income totals over the inclusive range.
pub fn totals(db: &Database, start: NaiveDate, end: NaiveDate) -> Result<FinanceTotals> {
    db.with_conn(|conn| {
        let mut stmt = conn.prepare(
            "SELECT type, COALESCE(SUM(amount), 0), COUNT(*) FROM finance WHERE date BETWEEN ?1 AND ?2 GROUP BY type",
        )?;
        let rows = stmt.query_map(
            params![time::format_date(start), time::format_date(end)],
            |row| {
                let kind: FinanceKind = parse_column(0, row.get(0)?)?;
                Ok((kind, row.get::<_, f64>(1)?, row.get::<_, u32>(2)?))
            },
        )?;

        let mut totals = FinanceTotals::default();
        for row in rows {
            match row? {
                (FinanceKind::Expense, sum, count) => {
                    totals.expense_total = sum;
                    totals.expense_count = count;
                }
                (FinanceKind::Income, sum, count) => {
                    totals.income_total = sum;
                    totals.income_count = count;
                }
            }
        }
        Ok(totals)
    })
}

/// Largest expense categories over the range, biggest first.
pub fn top_categories(
    db: &Database,
    start: NaiveDate,
    end: NaiveDate,
    limit: usize,
) -> Result<Vec<CategoryTotal>> {
    db.with_conn(|conn| {
        let mut stmt = conn.prepare(
            "SELECT COALESCE(category, 'uncategorized'), SUM(amount), COUNT(*) FROM finance
             WHERE type = 'expense' AND date BETWEEN ?1 AND ?2
             GROUP BY 1 ORDER BY 2 DESC, 1 ASC LIMIT ?3",
        )?;
        let rows = stmt.query_map(
            params![time::format_date(start), time::format_date(end), limit as i64],
            |row| {
                Ok(CategoryTotal {
                    category: row.get(0)?,
                    total: row.get(1)?,
                    count: row.get(2)?,
                })
            },
        )?;
        let categories = rows.collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(categories)
    })
}

/// Plain-text listing for the `query_finance` structured path.
pub fn render_list(records: &[FinanceRecord]) -> String {
    if records.is_empty() {
        return "No finance records found".to_string();
    }
    let mut out = String::new();
    for r in records {
        let label = r
            .category
            .as_deref()
            .or(r.source.as_deref())
            .unwrap_or("uncategorized");
        out.push_str(&format!("#{} {} {} {:.2} ({label})", r.id, r.date, r.kind, r.amount));
        if let Some(note) = &r.note {
            out.push_str(&format!(" - {note}"));
        }
        out.push('\n');
    }
    out
}

fn row_to_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<FinanceRecord> {
    Ok(FinanceRecord {
        id: row.get(0)?,
        kind: parse_column(1, row.get(1)?)?,
        amount: row.get(2)?,
        category: row.get(3)?,
        source: row.get(4)?,
        note: row.get(5)?,
        date: row.get(6)?,
        created_at: row.get(7)?,
    })
}

/// Case-insensitive whole-word check that `sql` names `table`.
pub(crate) fn mentions_table(sql: &str, table: &str) -> bool {
    sql.split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .any(|word| word.eq_ignore_ascii_case(table))
}
