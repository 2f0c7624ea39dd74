//! Health metrics.
//!
//! Metric types are open strings. A small conventional set gets a display
//! name and a default unit; anything else is stored and shown verbatim.

use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate};
use rusqlite::{params, OptionalExtension};
use serde::Serialize;

use crate::db::{Database, QueryResult};
use crate::error::{Error, Result};
use crate::records::finance::mentions_table;
use crate::records::types::HealthRecord;
use crate::time;

const SELECT_COLUMNS: &str =
    "SELECT id, metric_type, value, unit, note, date, created_at FROM health";

/// `(key, display name, default unit)` in presentation order.
pub const CONVENTIONAL_METRICS: [(&str, &str, &str); 6] = [
    ("blood_pressure", "Blood Pressure", "mmHg"),
    ("heart_rate", "Heart Rate", "bpm"),
    ("weight", "Weight", "kg"),
    ("blood_sugar", "Blood Sugar", "mmol/L"),
    ("sleep", "Sleep", "hours"),
    ("exercise", "Exercise", "minutes"),
];

pub const DEFAULT_QUERY_DAYS: u32 = 30;

pub fn display_name(metric_type: &str) -> &str {
    CONVENTIONAL_METRICS
        .iter()
        .find(|(key, _, _)| *key == metric_type)
        .map_or(metric_type, |(_, name, _)| *name)
}

pub fn default_unit(metric_type: &str) -> Option<&'static str> {
    CONVENTIONAL_METRICS
        .iter()
        .find(|(key, _, _)| *key == metric_type)
        .map(|(_, _, unit)| *unit)
}

fn conventional_rank(metric_type: &str) -> Option<usize> {
    CONVENTIONAL_METRICS
        .iter()
        .position(|(key, _, _)| *key == metric_type)
}

#[derive(Debug, Clone, Default)]
pub struct NewHealthMetric {
    pub metric_type: String,
    pub value: String,
    /// Falls back to the metric's default unit.
    pub unit: Option<String>,
    pub note: Option<String>,
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Clone)]
pub struct HealthQuery {
    pub metric_type: Option<String>,
    pub days: u32,
}

impl Default for HealthQuery {
    fn default() -> Self {
        Self {
            metric_type: None,
            days: DEFAULT_QUERY_DAYS,
        }
    }
}

/// Per-metric aggregate over a date range. `min`/`max` only cover readings
/// that parse as numbers, so `120/80` style values contribute to `count` only.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricStats {
    pub metric_type: String,
    pub count: u32,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub unit: Option<String>,
}

impl HealthRecord {
    pub fn confirmation(&self) -> String {
        let mut line = format!(
            "Recorded {} #{} on {}: {}",
            display_name(&self.metric_type),
            self.id,
            self.date,
            self.value
        );
        if let Some(unit) = &self.unit {
            line.push_str(&format!(" {unit}"));
        }
        if let Some(note) = &self.note {
            line.push_str(&format!(", note: {note}"));
        }
        line
    }

    /// `value unit`, or just the value when there is no unit.
    pub fn reading(&self) -> String {
        match &self.unit {
            Some(unit) => format!("{} {unit}", self.value),
            None => self.value.clone(),
        }
    }
}

pub fn record(db: &Database, metric: NewHealthMetric) -> Result<HealthRecord> {
    let metric_type = metric.metric_type.trim();
    if metric_type.is_empty() {
        return Err(Error::validation("metric_type must not be empty"));
    }
    let value = metric.value.trim();
    if value.is_empty() {
        return Err(Error::validation("value must not be empty"));
    }

    let unit = metric
        .unit
        .as_deref()
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .or_else(|| default_unit(metric_type));
    let note = metric.note.as_deref().map(str::trim).filter(|n| !n.is_empty());
    let date = time::format_date(metric.date.unwrap_or_else(time::today));

    let record = db.with_conn(|conn| {
        let id: i64 = conn.query_row(
            "INSERT INTO health (metric_type, value, unit, note, date, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6) RETURNING id",
            params![metric_type, value, unit, note, date, time::now_timestamp()],
            |row| row.get(0),
        )?;
        conn.query_row(&format!("{SELECT_COLUMNS} WHERE id = ?1"), params![id], row_to_record)
    })?;
    tracing::info!(id = record.id, metric_type, date = %record.date, "health metric stored");
    Ok(record)
}

pub fn get(db: &Database, id: i64) -> Result<Option<HealthRecord>> {
    db.with_conn(|conn| {
        conn.query_row(
            &format!("{SELECT_COLUMNS} WHERE id = ?1"),
            params![id],
            row_to_record,
        )
        .optional()
    })
}

/// Agent-supplied read-only SQL over the `health` table.
pub fn query(db: &Database, sql: &str) -> Result<QueryResult> {
    if !mentions_table(sql, "health") {
        return Err(Error::invalid_query(sql, "query must target the health table"));
    }
    db.query(sql, &[])
}

/// Records from the last `days` days, oldest first (creation order within a day).
pub fn recent(db: &Database, query: &HealthQuery, today: NaiveDate) -> Result<Vec<HealthRecord>> {
    let since = today
        .checked_sub_signed(Duration::days(i64::from(query.days)))
        .unwrap_or(NaiveDate::MIN);
    let since = time::format_date(since);
    let metric = query
        .metric_type
        .as_deref()
        .map(str::trim)
        .filter(|m| !m.is_empty());

    db.with_conn(|conn| {
        let mut stmt = conn.prepare(&format!(
            "{SELECT_COLUMNS} WHERE date >= ?1 AND (?2 IS NULL OR metric_type = ?2)
             ORDER BY date ASC, id ASC"
        ))?;
        let records = stmt
            .query_map(params![since, metric], row_to_record)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(records)
    })
}

/// Every record, oldest first.
pub fn all(db: &Database) -> Result<Vec<HealthRecord>> {
    db.with_conn(|conn| {
        let mut stmt = conn.prepare(&format!("{SELECT_COLUMNS} ORDER BY date ASC, id ASC"))?;
        let records = stmt
            .query_map([], row_to_record)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(records)
    })
}

/// Most recent reading per metric inside the range; conventional metrics
/// first in their usual order, then the rest alphabetically.
pub fn latest_per_metric(
    db: &Database,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<HealthRecord>> {
    let mut latest: Vec<HealthRecord> = db.with_conn(|conn| {
        let mut stmt = conn.prepare(&format!(
            "{SELECT_COLUMNS} h WHERE date BETWEEN ?1 AND ?2 AND id = (
                SELECT id FROM health
                WHERE metric_type = h.metric_type AND date BETWEEN ?1 AND ?2
                ORDER BY date DESC, id DESC LIMIT 1
             )"
        ))?;
        let records = stmt
            .query_map(
                params![time::format_date(start), time::format_date(end)],
                row_to_record,
            )?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(records)
    })?;

    latest.sort_by(|a, b| metric_order(&a.metric_type, &b.metric_type));
    Ok(latest)
}

/// Count and numeric range per metric inside the range.
pub fn range_stats(db: &Database, start: NaiveDate, end: NaiveDate) -> Result<Vec<MetricStats>> {
    let rows: Vec<(String, String, Option<String>)> = db.with_conn(|conn| {
        let mut stmt = conn.prepare(
            "SELECT metric_type, value, unit FROM health WHERE date BETWEEN ?1 AND ?2 ORDER BY date, id",
        )?;
        let rows = stmt
            .query_map(
                params![time::format_date(start), time::format_date(end)],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    })?;

    let mut by_metric: BTreeMap<String, MetricStats> = BTreeMap::new();
    for (metric_type, value, unit) in rows {
        let stats = by_metric
            .entry(metric_type.clone())
            .or_insert_with(|| MetricStats {
                metric_type,
                count: 0,
                min: None,
                max: None,
                unit: None,
            });
        stats.count += 1;
        if unit.is_some() {
            stats.unit = unit;
        }
        if let Ok(v) = value.trim().parse::<f64>() {
            stats.min = Some(stats.min.map_or(v, |m| m.min(v)));
            stats.max = Some(stats.max.map_or(v, |m| m.max(v)));
        }
    }

    let mut stats: Vec<MetricStats> = by_metric.into_values().collect();
    stats.sort_by(|a, b| metric_order(&a.metric_type, &b.metric_type));
    Ok(stats)
}

fn metric_order(a: &str, b: &str) -> std::cmp::Ordering {
    match (conventional_rank(a), conventional_rank(b)) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => a.cmp(b),
    }
}

/// Text listing for the `query_health` structured path.
pub fn render_recent(records: &[HealthRecord], query: &HealthQuery) -> String {
    let days = query.days;
    if records.is_empty() {
        return format!("No health records in the last {days} days");
    }

    let metric = query.metric_type.as_deref().filter(|m| !m.trim().is_empty());
    let title = match metric {
        Some(m) => format!("{} Records (last {days} days):", display_name(m)),
        None => format!("Health Records (last {days} days):"),
    };

    let mut lines = vec![title, String::new()];
    for r in records {
        let mut line = match metric {
            Some(_) => format!("  {}: {}", r.date, r.reading()),
            None => format!("  {} [{}]: {}", r.date, display_name(&r.metric_type), r.reading()),
        };
        if let Some(note) = &r.note {
            line.push_str(&format!(" ({note})"));
        }
        lines.push(line);
    }
    lines.join("\n")
}

fn row_to_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<HealthRecord> {
    Ok(HealthRecord {
        id: row.get(0)?,
        metric_type: row.get(1)?,
        value: row.get(2)?,
        unit: row.get(3)?,
        note: row.get(4)?,
        date: row.get(5)?,
        created_at: row.get(6)?,
    })
}
