use anyhow::Result;
use serde::Serialize;

use daybook::config::DaybookConfig;
use daybook::diary::DiaryEntry;
use daybook::records::finance::{self, FinanceFilter};
use daybook::records::todo::{self, StatusFilter, TodoFilter};
use daybook::records::{health, FinanceRecord, HealthRecord, TodoRecord};

/// Export format: every record and every diary entry.
#[derive(Debug, Serialize)]
struct ExportData {
    finance: Vec<FinanceRecord>,
    todos: Vec<TodoRecord>,
    health: Vec<HealthRecord>,
    diary: Vec<DiaryEntry>,
}

/// Export all records and diary entries as JSON to stdout.
pub fn export(config: &DaybookConfig) -> Result<()> {
    let (db, diary) = daybook::server::setup_shared_state(config)?;

    let mut finance = finance::list(&db, &FinanceFilter::default())?;
    finance.reverse();

    let todos = todo::list(
        &db,
        &TodoFilter {
            topic: None,
            status: StatusFilter::All,
        },
    )?;

    let data = ExportData {
        finance,
        todos,
        health: health::all(&db)?,
        diary: diary.search(None, None, None)?.map(|(_, entry)| entry).collect(),
    };

    let json = serde_json::to_string_pretty(&data)?;
    println!("{json}");

    eprintln!(
        "Exported {} finance records, {} todos, {} health records and {} diary entries.",
        data.finance.len(),
        data.todos.len(),
        data.health.len(),
        data.diary.len()
    );

    Ok(())
}
