//! MCP finance tool parameter definitions.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parameters for the `record_expense` MCP tool.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct RecordExpenseParams {
    #[schemars(description = "Amount spent; must be greater than zero")]
    pub amount: f64,

    #[schemars(
        description = "Expense category, e.g. 'food', 'transport', 'shopping', 'entertainment', 'housing', 'health'. Any label is accepted."
    )]
    pub category: String,

    #[schemars(description = "Optional free-text note")]
    pub note: Option<String>,

    #[schemars(description = "Date in YYYY-MM-DD format. Defaults to today.")]
    pub date: Option<String>,
}

/// Parameters for the `record_income` MCP tool.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct RecordIncomeParams {
    #[schemars(description = "Amount received; must be greater than zero")]
    pub amount: f64,

    #[schemars(description = "Income source, e.g. 'salary', 'freelance', 'gift'")]
    pub source: String,

    #[schemars(description = "Optional free-text note")]
    pub note: Option<String>,

    #[schemars(description = "Date in YYYY-MM-DD format. Defaults to today.")]
    pub date: Option<String>,
}

/// Parameters for the `query_finance` MCP tool.
///
/// `sql` takes precedence; without it the structured filters are used.
#[derive(Debug, Default, Serialize, Deserialize, JsonSchema)]
pub struct QueryFinanceParams {
    #[schemars(
        description = "A single read-only SELECT over the finance table (columns: id, type, amount, category, source, note, date, created_at). Overrides the other filters."
    )]
    pub sql: Option<String>,

    #[schemars(description = "Filter by type: 'expense' or 'income'")]
    pub r#type: Option<String>,

    #[schemars(description = "Filter by expense category or income source (case-insensitive)")]
    pub category: Option<String>,

    #[schemars(description = "Inclusive start date, YYYY-MM-DD")]
    pub start_date: Option<String>,

    #[schemars(description = "Inclusive end date, YYYY-MM-DD")]
    pub end_date: Option<String>,
}
