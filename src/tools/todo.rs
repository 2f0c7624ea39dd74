//! MCP todo tool parameter definitions.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parameters for the `add_todo` MCP tool.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct AddTodoParams {
    #[schemars(description = "What needs to be done")]
    pub content: String,

    #[schemars(description = "Optional topic or project, e.g. 'work', 'home'")]
    pub topic: Option<String>,

    #[schemars(description = "Optional due date in YYYY-MM-DD format")]
    pub due_date: Option<String>,
}

/// Parameters for the `complete_todo` MCP tool. Provide exactly one field.
#[derive(Debug, Default, Serialize, Deserialize, JsonSchema)]
pub struct CompleteTodoParams {
    #[schemars(description = "ID of the todo to complete")]
    pub todo_id: Option<i64>,

    #[schemars(
        description = "Case-insensitive text contained in the todo. When several pending todos match, the most recently added one is completed."
    )]
    pub content_match: Option<String>,
}

/// Parameters for the `list_todos` MCP tool.
#[derive(Debug, Default, Serialize, Deserialize, JsonSchema)]
pub struct ListTodosParams {
    #[schemars(description = "Only list todos with this topic")]
    pub topic: Option<String>,

    #[schemars(description = "'pending' (default), 'completed' or 'all'")]
    pub status: Option<String>,

    #[schemars(description = "Prepend a warning when overdue todos exist. Defaults to true.")]
    pub include_overdue_reminder: Option<bool>,
}
