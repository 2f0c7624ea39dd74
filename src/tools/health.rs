//! MCP health tool parameter definitions.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parameters for the `record_health` MCP tool.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct RecordHealthParams {
    #[schemars(
        description = "Metric type, e.g. 'blood_pressure', 'heart_rate', 'weight', 'blood_sugar', 'sleep', 'exercise'. Other names are accepted."
    )]
    pub metric_type: String,

    #[schemars(description = "Reading as text, e.g. '120/80' or '72.5'")]
    pub value: String,

    #[schemars(description = "Unit; defaults to the usual unit for well-known metrics")]
    pub unit: Option<String>,

    #[schemars(description = "Optional free-text note")]
    pub note: Option<String>,

    #[schemars(description = "Date in YYYY-MM-DD format. Defaults to today.")]
    pub date: Option<String>,
}

/// Parameters for the `query_health` MCP tool.
#[derive(Debug, Default, Serialize, Deserialize, JsonSchema)]
pub struct QueryHealthParams {
    #[schemars(
        description = "A single read-only SELECT over the health table (columns: id, metric_type, value, unit, note, date, created_at). Overrides the other filters."
    )]
    pub sql: Option<String>,

    #[schemars(description = "Only return this metric type")]
    pub metric_type: Option<String>,

    #[schemars(description = "How many days back to look. Defaults to 30.")]
    pub days: Option<u32>,
}
