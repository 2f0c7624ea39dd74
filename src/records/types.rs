//! Record type definitions.
//!
//! Defines [`FinanceKind`] and [`TodoStatus`] (the two closed enumerations in
//! the schema) and the row structs for the three SQLite tables. Categories,
//! income sources and health metric types are deliberately open strings.

use serde::{Deserialize, Serialize};

/// Whether a finance row is money going out or coming in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinanceKind {
    /// Money spent; `category` is the active label.
    Expense,
    /// Money received; `source` is the active label.
    Income,
}

impl FinanceKind {
    /// SQL-compatible string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Expense => "expense",
            Self::Income => "income",
        }
    }
}

impl std::fmt::Display for FinanceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for FinanceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "expense" => Ok(Self::Expense),
            "income" => Ok(Self::Income),
            _ => Err(format!("unknown finance type: {s}")),
        }
    }
}

/// Todo lifecycle. `Completed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TodoStatus {
    Pending,
    Completed,
}

impl TodoStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
        }
    }
}

impl std::fmt::Display for TodoStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TodoStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "completed" => Ok(Self::Completed),
            _ => Err(format!("unknown todo status: {s}")),
        }
    }
}

/// A row of the `finance` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinanceRecord {
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: FinanceKind,
    /// Always positive; the kind carries the sign.
    pub amount: f64,
    pub category: Option<String>,
    pub source: Option<String>,
    pub note: Option<String>,
    /// `YYYY-MM-DD`.
    pub date: String,
    /// `YYYY-MM-DD HH:MM:SS`, local time.
    pub created_at: String,
}

/// A row of the `todos` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TodoRecord {
    pub id: i64,
    pub content: String,
    pub topic: Option<String>,
    pub due_date: Option<String>,
    pub status: TodoStatus,
    /// Set exactly once, on the transition to `Completed`.
    pub completed_at: Option<String>,
    pub created_at: String,
}

/// A row of the `health` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthRecord {
    pub id: i64,
    pub metric_type: String,
    /// Stored as text so readings like `120/80` keep their shape.
    pub value: String,
    pub unit: Option<String>,
    pub note: Option<String>,
    pub date: String,
    pub created_at: String,
}

/// Map a TEXT column holding an enum name into the enum, surfacing bad data as
/// a conversion error instead of panicking.
pub(crate) fn parse_column<T>(idx: usize, raw: String) -> rusqlite::Result<T>
where
    T: std::str::FromStr<Err = String>,
{
    raw.parse().map_err(|e: String| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            rusqlite::types::Type::Text,
            e.into(),
        )
    })
}
