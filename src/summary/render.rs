use std::fmt::Write;

use super::{Digest, Period, WEEKLY_DAYS};
use crate::records::health::display_name;

const PREVIEW_CHARS: usize = 50;

pub(super) fn render(digest: &Digest) -> String {
    let mut out = String::new();
    // Writing to a String cannot fail
    let _ = write_digest(&mut out, digest);
    out.trim_end().to_string()
}

fn write_digest(out: &mut String, digest: &Digest) -> std::fmt::Result {
    let title = match digest.period {
        Period::Day { date } => format!("Daily Summary for {date}"),
        Period::Range { start, end } if (end - start).num_days() + 1 == i64::from(WEEKLY_DAYS) => {
            format!("Weekly Summary ({start} to {end})")
        }
        Period::Range { start, end } => format!("Summary ({start} to {end})"),
    };
    writeln!(out, "{title}")?;
    writeln!(out, "{}", "=".repeat(title.len()))?;
    writeln!(out)?;

    let is_range = matches!(digest.period, Period::Range { .. });

    // Finance
    let totals = &digest.finance.totals;
    if totals.expense_count == 0 && totals.income_count == 0 {
        writeln!(out, "Finance: No transactions")?;
    } else {
        writeln!(out, "Finance:")?;
        writeln!(
            out,
            "  Income: +{:.2} ({} transactions)",
            totals.income_total, totals.income_count
        )?;
        writeln!(
            out,
            "  Expense: -{:.2} ({} transactions)",
            totals.expense_total, totals.expense_count
        )?;
        writeln!(out, "  Net: {:+.2}", totals.net())?;
        if !digest.finance.top_categories.is_empty() {
            writeln!(out, "  Top Categories:")?;
            for c in &digest.finance.top_categories {
                writeln!(out, "    - {}: {:.2}", c.category, c.total)?;
            }
        }
    }
    writeln!(out)?;

    // Todos
    let todos = &digest.todos;
    writeln!(out, "Todos:")?;
    let period_label = if is_range { "this period" } else { "today" };
    writeln!(out, "  Completed {period_label}: {}", todos.completed_in_period)?;
    writeln!(out, "  Pending: {}", todos.pending)?;
    writeln!(out, "  Overdue: {}", todos.overdue)?;
    writeln!(out)?;

    // Health
    if digest.health.latest.is_empty() {
        writeln!(out, "Health: No records")?;
    } else {
        writeln!(out, "Health:")?;
        for r in &digest.health.latest {
            write!(out, "  {}: {}", display_name(&r.metric_type), r.reading())?;
            if is_range {
                write!(out, " (latest, {})", r.date)?;
            }
            writeln!(out)?;
        }
        for s in &digest.health.stats {
            write!(out, "  {} readings: {}", display_name(&s.metric_type), s.count)?;
            if let (Some(min), Some(max)) = (s.min, s.max) {
                let unit = s.unit.as_deref().map(|u| format!(" {u}")).unwrap_or_default();
                write!(out, ", range {min}-{max}{unit}")?;
            }
            writeln!(out)?;
        }
    }
    writeln!(out)?;

    // Diary
    let diary = &digest.diary;
    if diary.entry_count == 0 {
        writeln!(out, "Diary: No entries")?;
    } else {
        writeln!(out, "Diary: {} entries", diary.entry_count)?;
        for entry in &diary.previews {
            let time = entry
                .datetime
                .split_once(' ')
                .map_or(entry.datetime.as_str(), |(_, t)| t);
            writeln!(out, "  [{time}] {}", preview(&entry.content))?;
        }
        if !diary.previews.is_empty() && diary.entry_count > diary.previews.len() {
            writeln!(
                out,
                "  ... and {} more entries",
                diary.entry_count - diary.previews.len()
            )?;
        }
    }

    Ok(())
}

fn preview(content: &str) -> String {
    if content.chars().count() > PREVIEW_CHARS {
        let cut: String = content.chars().take(PREVIEW_CHARS).collect();
        format!("{cut}...")
    } else {
        content.to_string()
    }
}
