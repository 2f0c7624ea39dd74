//! Todo tasks: add, complete, list.
//!
//! Completion by content match picks the pending todo with the highest id
//! when several match. A todo that is already completed is reported as such
//! rather than treated as an error.

use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension};
use serde::Serialize;

use crate::db::Database;
use crate::error::{Error, Result};
use crate::records::types::{parse_column, TodoRecord, TodoStatus};
use crate::time;

const SELECT_COLUMNS: &str =
    "SELECT id, content, topic, due_date, status, completed_at, created_at FROM todos";

#[derive(Debug, Clone, Default)]
pub struct NewTodo {
    pub content: String,
    pub topic: Option<String>,
    pub due_date: Option<NaiveDate>,
}

/// Which todo `complete` should act on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionTarget {
    Id(i64),
    /// Case-insensitive substring of the todo's content.
    ContentMatch(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Completion {
    /// The todo transitioned to completed just now.
    Completed(TodoRecord),
    /// The todo was completed earlier; nothing changed.
    AlreadyCompleted(TodoRecord),
}

impl Completion {
    pub fn record(&self) -> &TodoRecord {
        match self {
            Self::Completed(r) | Self::AlreadyCompleted(r) => r,
        }
    }

    pub fn message(&self) -> String {
        match self {
            Self::Completed(r) => format!("Completed todo #{}: {}", r.id, r.content),
            Self::AlreadyCompleted(r) => format!(
                "Todo #{} was already completed at {}: {}",
                r.id,
                r.completed_at.as_deref().unwrap_or("an unknown time"),
                r.content
            ),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    Pending,
    Completed,
    All,
}

impl std::str::FromStr for StatusFilter {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "completed" => Ok(Self::Completed),
            "all" => Ok(Self::All),
            _ => Err(format!(
                "unknown todo status filter: {s} (expected pending, completed or all)"
            )),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct TodoFilter {
    pub topic: Option<String>,
    pub status: StatusFilter,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TodoCounts {
    pub completed_in_period: u32,
    pub pending: u32,
    pub overdue: u32,
}

impl TodoRecord {
    pub fn confirmation(&self) -> String {
        let mut line = format!("Added todo #{}: {}", self.id, self.content);
        if let Some(topic) = &self.topic {
            line.push_str(&format!(", topic: {topic}"));
        }
        if let Some(due) = &self.due_date {
            line.push_str(&format!(", due: {due}"));
        }
        line
    }

    /// Pending with a due date strictly before `today`.
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.status == TodoStatus::Pending
            && self
                .due_date
                .as_deref()
                .is_some_and(|due| due < time::format_date(today).as_str())
    }
}

pub fn add(db: &Database, todo: NewTodo) -> Result<TodoRecord> {
    let content = todo.content.trim();
    if content.is_empty() {
        return Err(Error::validation("todo content must not be empty"));
    }
    let topic = todo.topic.as_deref().map(str::trim).filter(|t| !t.is_empty());
    let due = todo.due_date.map(time::format_date);

    let record = db.with_conn(|conn| {
        let id: i64 = conn.query_row(
            "INSERT INTO todos (content, topic, due_date, status, created_at) VALUES (?1, ?2, ?3, 'pending', ?4) RETURNING id",
            params![content, topic, due, time::now_timestamp()],
            |row| row.get(0),
        )?;
        conn.query_row(&format!("{SELECT_COLUMNS} WHERE id = ?1"), params![id], row_to_record)
    })?;
    tracing::info!(id = record.id, topic = ?record.topic, "todo added");
    Ok(record)
}

pub fn get(db: &Database, id: i64) -> Result<Option<TodoRecord>> {
    db.with_conn(|conn| {
        conn.query_row(
            &format!("{SELECT_COLUMNS} WHERE id = ?1"),
            params![id],
            row_to_record,
        )
        .optional()
    })
}

pub fn complete(db: &Database, target: CompletionTarget) -> Result<Completion> {
    if let CompletionTarget::ContentMatch(needle) = &target {
        if needle.trim().is_empty() {
            return Err(Error::validation("content match must not be empty"));
        }
    }

    // Lookup and update share one lock, so racing completions of the same
    // todo yield exactly one `Completed`.
    let outcome = db.with_conn(|conn| {
        let found = match &target {
            CompletionTarget::Id(id) => conn
                .query_row(&format!("{SELECT_COLUMNS} WHERE id = ?1"), params![id], row_to_record)
                .optional()?,
            CompletionTarget::ContentMatch(needle) => find_by_content(conn, needle.trim())?,
        };
        let Some(todo) = found else {
            return Ok(None);
        };
        if todo.status == TodoStatus::Completed {
            return Ok(Some(Completion::AlreadyCompleted(todo)));
        }

        let changed = conn.execute(
            "UPDATE todos SET status = 'completed', completed_at = ?1 WHERE id = ?2 AND status = 'pending'",
            params![time::now_timestamp(), todo.id],
        )?;
        let record = conn.query_row(
            &format!("{SELECT_COLUMNS} WHERE id = ?1"),
            params![todo.id],
            row_to_record,
        )?;
        Ok(Some(if changed == 0 {
            Completion::AlreadyCompleted(record)
        } else {
            Completion::Completed(record)
        }))
    })?;

    let completion = outcome.ok_or_else(|| match &target {
        CompletionTarget::Id(id) => Error::NotFound(format!("todo #{id} not found")),
        CompletionTarget::ContentMatch(needle) => {
            Error::NotFound(format!("no todo found matching '{}'", needle.trim()))
        }
    })?;
    match &completion {
        Completion::Completed(record) => tracing::info!(id = record.id, "todo completed"),
        Completion::AlreadyCompleted(record) => {
            tracing::debug!(id = record.id, "todo already completed")
        }
    }
    Ok(completion)
}

/// Highest-id pending match, else highest-id completed match.
fn find_by_content(conn: &Connection, needle: &str) -> rusqlite::Result<Option<TodoRecord>> {
    conn.query_row(
        &format!(
            "{SELECT_COLUMNS} WHERE instr(lower(content), lower(?1)) > 0
             ORDER BY CASE status WHEN 'pending' THEN 0 ELSE 1 END, id DESC LIMIT 1"
        ),
        params![needle],
        row_to_record,
    )
    .optional()
}

/// Todos with a due date first (earliest first), then newest first.
pub fn list(db: &Database, filter: &TodoFilter) -> Result<Vec<TodoRecord>> {
    let status = match filter.status {
        StatusFilter::Pending => Some(TodoStatus::Pending.as_str()),
        StatusFilter::Completed => Some(TodoStatus::Completed.as_str()),
        StatusFilter::All => None,
    };
    let topic = filter.topic.as_deref().map(str::trim).filter(|t| !t.is_empty());

    db.with_conn(|conn| {
        let mut stmt = conn.prepare(&format!(
            "{SELECT_COLUMNS}
             WHERE (?1 IS NULL OR status = ?1) AND (?2 IS NULL OR topic = ?2 COLLATE NOCASE)
             ORDER BY due_date IS NULL, due_date ASC, created_at DESC, id DESC"
        ))?;
        let todos = stmt
            .query_map(params![status, topic], row_to_record)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(todos)
    })
}

/// Text listing with `[ ]` / `[x]` markers and an overdue warning header.
pub fn render_list(todos: &[TodoRecord], today: NaiveDate, include_overdue_reminder: bool) -> String {
    if todos.is_empty() {
        return "No todos found".to_string();
    }

    let mut overdue = 0;
    let mut lines = Vec::with_capacity(todos.len());
    for todo in todos {
        let mark = match todo.status {
            TodoStatus::Completed => "x",
            TodoStatus::Pending => " ",
        };
        let mut line = format!("  [{mark}] #{} {}", todo.id, todo.content);
        if let Some(topic) = &todo.topic {
            line.push_str(&format!(" [{topic}]"));
        }
        if todo.status == TodoStatus::Pending {
            if let Some(due) = &todo.due_date {
                if todo.is_overdue(today) {
                    overdue += 1;
                    line.push_str(&format!(" OVERDUE({due})"));
                } else {
                    line.push_str(&format!(" (due: {due})"));
                }
            }
        } else if let Some(done) = &todo.completed_at {
            line.push_str(&format!(" (completed: {done})"));
        }
        lines.push(line);
    }

    let mut out = String::from("Todo List:\n");
    if include_overdue_reminder && overdue > 0 {
        out.push_str(&format!("Warning: You have {overdue} overdue task(s)!\n"));
    }
    out.push('\n');
    out.push_str(&lines.join("\n"));
    out
}

/// Counts for the summary: completions inside the range, plus the current
/// pending and overdue totals.
pub fn status_counts(
    db: &Database,
    start: NaiveDate,
    end: NaiveDate,
    today: NaiveDate,
) -> Result<TodoCounts> {
    db.with_conn(|conn| {
        conn.query_row(
            "SELECT
                COALESCE(SUM(status = 'completed' AND date(completed_at) BETWEEN ?1 AND ?2), 0),
                COALESCE(SUM(status = 'pending'), 0),
                COALESCE(SUM(status = 'pending' AND due_date IS NOT NULL AND due_date < ?3), 0)
             FROM todos",
            params![
                time::format_date(start),
                time::format_date(end),
                time::format_date(today)
            ],
            |row| {
                Ok(TodoCounts {
                    completed_in_period: row.get(0)?,
                    pending: row.get(1)?,
                    overdue: row.get(2)?,
                })
            },
        )
    })
}

fn row_to_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<TodoRecord> {
    Ok(TodoRecord {
        id: row.get(0)?,
        content: row.get(1)?,
        topic: row.get(2)?,
        due_date: row.get(3)?,
        status: parse_column(4, row.get(4)?)?,
        completed_at: row.get(5)?,
        created_at: row.get(6)?,
    })
}
