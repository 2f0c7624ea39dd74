//! MCP diary tool parameter definitions.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parameters for the `add_diary_entry` MCP tool.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct AddDiaryEntryParams {
    #[schemars(description = "The diary text")]
    pub content: String,

    #[schemars(
        description = "When it happened, 'YYYY-MM-DD HH:MM:SS'. Call current_time first to resolve phrases like 'yesterday 3pm'. Overrides 'date'."
    )]
    pub datetime: Option<String>,

    #[schemars(description = "Date in YYYY-MM-DD format; the current time of day is used. Defaults to today.")]
    pub date: Option<String>,

    #[schemars(description = "Optional tags, e.g. ['work', 'mood']")]
    pub tags: Option<Vec<String>>,
}

/// Parameters for the `search_diary` MCP tool.
#[derive(Debug, Default, Serialize, Deserialize, JsonSchema)]
pub struct SearchDiaryParams {
    #[schemars(description = "Case-insensitive text to look for in entry content")]
    pub keyword: Option<String>,

    #[schemars(description = "Only return entries carrying this tag")]
    pub tag: Option<String>,

    #[schemars(description = "Inclusive start date, YYYY-MM-DD")]
    pub start_date: Option<String>,

    #[schemars(description = "Inclusive end date, YYYY-MM-DD")]
    pub end_date: Option<String>,

    #[schemars(description = "Maximum number of entries to return. Defaults to 50.")]
    pub limit: Option<usize>,
}
