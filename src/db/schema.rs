//! SQL DDL for the daybook tables.
//!
//! Defines `finance`, `todos` and `health`. All DDL uses `IF NOT EXISTS`, so
//! [`init_schema`] is safe to run on every start and never touches existing rows.

use rusqlite::Connection;

/// Table names that the schema owns, in creation order.
pub const TABLES: [&str; 3] = ["finance", "todos", "health"];

const SCHEMA_SQL: &str = r#"
-- Expenses and income
CREATE TABLE IF NOT EXISTS finance (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    type TEXT NOT NULL CHECK(type IN ('expense','income')),
    amount REAL NOT NULL CHECK(amount > 0),
    category TEXT,
    source TEXT,
    note TEXT,
    date TEXT NOT NULL,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_finance_date ON finance(date);
CREATE INDEX IF NOT EXISTS idx_finance_type ON finance(type);

-- Todo items
CREATE TABLE IF NOT EXISTS todos (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    content TEXT NOT NULL,
    topic TEXT,
    due_date TEXT,
    status TEXT NOT NULL DEFAULT 'pending' CHECK(status IN ('pending','completed')),
    completed_at TEXT,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_todos_status ON todos(status);
CREATE INDEX IF NOT EXISTS idx_todos_topic ON todos(topic);

-- Health metrics; value is TEXT so composite readings like 120/80 survive
CREATE TABLE IF NOT EXISTS health (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    metric_type TEXT NOT NULL,
    value TEXT NOT NULL,
    unit TEXT,
    note TEXT,
    date TEXT NOT NULL,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_health_metric_date ON health(metric_type, date);
"#;

/// Initialize all schema tables. Idempotent (uses IF NOT EXISTS).
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA_SQL)
}
