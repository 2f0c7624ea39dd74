pub mod diary;
pub mod finance;
pub mod health;
pub mod todo;

use std::sync::Arc;

use diary::{AddDiaryEntryParams, SearchDiaryParams};
use finance::{QueryFinanceParams, RecordExpenseParams, RecordIncomeParams};
use health::{QueryHealthParams, RecordHealthParams};
use rmcp::handler::server::router::prompt::PromptRouter;
use rmcp::handler::server::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{
    AnnotateAble, GetPromptRequestParams, GetPromptResult, ListPromptsResult,
    ListResourcesResult, PaginatedRequestParams, PromptMessage, PromptMessageRole, RawResource,
    ReadResourceRequestParams, ReadResourceResult, ResourceContents,
};
use rmcp::service::RequestContext;
use rmcp::{
    prompt, prompt_handler, prompt_router, tool, tool_handler, tool_router, ErrorData, RoleServer,
    ServerHandler,
};
use todo::{AddTodoParams, CompleteTodoParams, ListTodosParams};

use crate::db::Database;
use crate::diary::DiaryStore;
use crate::error::Error;
use crate::records::finance::{FinanceFilter, NewExpense, NewIncome};
use crate::records::health::{HealthQuery, NewHealthMetric, DEFAULT_QUERY_DAYS};
use crate::records::todo::{CompletionTarget, NewTodo, StatusFilter, TodoFilter};
use crate::records::{self, FinanceKind};
use crate::prompts::{
    self, DailyReviewArgs, FinancialAnalysisArgs, HealthCheckupArgs, WeeklyPlanningArgs,
};
use crate::resources;
use crate::time;

const DEFAULT_DIARY_LIMIT: usize = 50;

/// The daybook MCP tool handler. Holds the shared stores and exposes every
/// tool via the `#[tool_router]` macro, the review prompts via
/// `#[prompt_router]`, plus the summary resources.
#[derive(Clone)]
pub struct DaybookTools {
    tool_router: ToolRouter<Self>,
    prompt_router: PromptRouter<Self>,
    db: Arc<Database>,
    diary: Arc<DiaryStore>,
}

/// Run storage work off the async runtime and flatten both failure layers
/// into the agent-facing `Error: ...` text.
async fn blocking<T, F>(work: F) -> Result<T, String>
where
    F: FnOnce() -> crate::error::Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| format!("Error: storage task failed: {e}"))?
        .map_err(|e| {
            tracing::warn!(kind = e.kind(), error = %e, "tool call failed");
            format!("Error: {e}")
        })
}

fn optional_date(value: Option<&str>) -> Result<Option<chrono::NaiveDate>, String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(time::parse_date)
        .transpose()
        .map_err(|e| format!("Error: {e}"))
}

#[tool_router]
impl DaybookTools {
    pub fn new(db: Arc<Database>, diary: Arc<DiaryStore>) -> Self {
        Self {
            tool_router: Self::tool_router(),
            prompt_router: Self::prompt_router(),
            db,
            diary,
        }
    }

    #[tool(description = "Record money spent. Category is free text (food, transport, shopping, ...).")]
    async fn record_expense(
        &self,
        Parameters(params): Parameters<RecordExpenseParams>,
    ) -> Result<String, String> {
        tracing::info!(amount = params.amount, category = %params.category, "record_expense called");
        let expense = NewExpense {
            amount: params.amount,
            category: params.category,
            note: params.note,
            date: optional_date(params.date.as_deref())?,
        };
        let db = Arc::clone(&self.db);
        let record = blocking(move || records::finance::record_expense(&db, expense)).await?;
        Ok(record.confirmation())
    }

    #[tool(description = "Record money received, with its source (salary, freelance, ...).")]
    async fn record_income(
        &self,
        Parameters(params): Parameters<RecordIncomeParams>,
    ) -> Result<String, String> {
        tracing::info!(amount = params.amount, source = %params.source, "record_income called");
        let income = NewIncome {
            amount: params.amount,
            source: params.source,
            note: params.note,
            date: optional_date(params.date.as_deref())?,
        };
        let db = Arc::clone(&self.db);
        let record = blocking(move || records::finance::record_income(&db, income)).await?;
        Ok(record.confirmation())
    }

    #[tool(description = "Query finance records with a read-only SELECT on the finance table, or with type/category/date filters.")]
    async fn query_finance(
        &self,
        Parameters(params): Parameters<QueryFinanceParams>,
    ) -> Result<String, String> {
        let db = Arc::clone(&self.db);

        if let Some(sql) = params.sql.filter(|s| !s.trim().is_empty()) {
            tracing::info!("query_finance called with sql");
            tracing::debug!(%sql, "finance sql");
            let result = blocking(move || records::finance::query(&db, &sql)).await?;
            return Ok(result.to_string());
        }

        let kind = params
            .r#type
            .as_deref()
            .map(|t| t.trim().to_lowercase().parse::<FinanceKind>())
            .transpose()
            .map_err(|e| format!("Error: {e}"))?;
        let filter = FinanceFilter {
            kind,
            category: params.category,
            start: optional_date(params.start_date.as_deref())?,
            end: optional_date(params.end_date.as_deref())?,
        };
        tracing::info!(?filter, "query_finance called");
        let rows = blocking(move || records::finance::list(&db, &filter)).await?;
        Ok(records::finance::render_list(&rows))
    }

    #[tool(description = "Add a todo with an optional topic and due date.")]
    async fn add_todo(
        &self,
        Parameters(params): Parameters<AddTodoParams>,
    ) -> Result<String, String> {
        tracing::info!(topic = ?params.topic, "add_todo called");
        let todo = NewTodo {
            content: params.content,
            topic: params.topic,
            due_date: optional_date(params.due_date.as_deref())?,
        };
        let db = Arc::clone(&self.db);
        let record = blocking(move || records::todo::add(&db, todo)).await?;
        Ok(record.confirmation())
    }

    #[tool(description = "Mark a todo as completed, by todo_id or by content_match (case-insensitive substring).")]
    async fn complete_todo(
        &self,
        Parameters(params): Parameters<CompleteTodoParams>,
    ) -> Result<String, String> {
        let target = match (params.todo_id, params.content_match) {
            (Some(id), None) => CompletionTarget::Id(id),
            (None, Some(text)) => CompletionTarget::ContentMatch(text),
            (Some(_), Some(_)) => {
                return Err("Error: provide either todo_id or content_match, not both".into())
            }
            (None, None) => return Err("Error: provide todo_id or content_match".into()),
        };
        tracing::info!(?target, "complete_todo called");
        let db = Arc::clone(&self.db);
        let completion = blocking(move || records::todo::complete(&db, target)).await?;
        Ok(completion.message())
    }

    #[tool(description = "List todos filtered by topic and status ('pending' by default, 'completed' or 'all'). Overdue items are flagged.")]
    async fn list_todos(
        &self,
        Parameters(params): Parameters<ListTodosParams>,
    ) -> Result<String, String> {
        let status = params
            .status
            .as_deref()
            .map(|s| s.trim().to_lowercase().parse::<StatusFilter>())
            .transpose()
            .map_err(|e| format!("Error: {e}"))?
            .unwrap_or_default();
        let filter = TodoFilter {
            topic: params.topic,
            status,
        };
        let reminder = params.include_overdue_reminder.unwrap_or(true);
        tracing::info!(?filter, "list_todos called");

        let db = Arc::clone(&self.db);
        let todos = blocking(move || records::todo::list(&db, &filter)).await?;
        Ok(records::todo::render_list(&todos, time::today(), reminder))
    }

    #[tool(description = "Record a health metric such as blood_pressure (120/80), heart_rate, weight, blood_sugar, sleep or exercise.")]
    async fn record_health(
        &self,
        Parameters(params): Parameters<RecordHealthParams>,
    ) -> Result<String, String> {
        tracing::info!(metric_type = %params.metric_type, "record_health called");
        let metric = NewHealthMetric {
            metric_type: params.metric_type,
            value: params.value,
            unit: params.unit,
            note: params.note,
            date: optional_date(params.date.as_deref())?,
        };
        let db = Arc::clone(&self.db);
        let record = blocking(move || records::health::record(&db, metric)).await?;
        Ok(record.confirmation())
    }

    #[tool(description = "Query health records with a read-only SELECT on the health table, or by metric type over the last N days.")]
    async fn query_health(
        &self,
        Parameters(params): Parameters<QueryHealthParams>,
    ) -> Result<String, String> {
        let db = Arc::clone(&self.db);

        if let Some(sql) = params.sql.filter(|s| !s.trim().is_empty()) {
            tracing::info!("query_health called with sql");
            tracing::debug!(%sql, "health sql");
            let result = blocking(move || records::health::query(&db, &sql)).await?;
            return Ok(result.to_string());
        }

        let query = HealthQuery {
            metric_type: params.metric_type,
            days: params.days.unwrap_or(DEFAULT_QUERY_DAYS),
        };
        tracing::info!(?query, "query_health called");
        let today = time::today();
        let (rows, query) = blocking(move || {
            records::health::recent(&db, &query, today).map(|rows| (rows, query))
        })
        .await?;
        Ok(records::health::render_recent(&rows, &query))
    }

    #[tool(description = "Write a diary entry. Use datetime for a specific moment (call current_time to resolve relative phrases) or date for a day.")]
    async fn add_diary_entry(
        &self,
        Parameters(params): Parameters<AddDiaryEntryParams>,
    ) -> Result<String, String> {
        let tags = params.tags.unwrap_or_default();
        let datetime = params
            .datetime
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(time::parse_datetime)
            .transpose()
            .map_err(|e| format!("Error: {e}"))?;
        let date = optional_date(params.date.as_deref())?;
        tracing::info!(?datetime, ?date, tags = tags.len(), "add_diary_entry called");

        let diary = Arc::clone(&self.diary);
        let content = params.content;
        let entry = blocking(move || match datetime {
            Some(at) => diary.append_at(at, &content, tags),
            None => diary.append(date.unwrap_or_else(time::today), &content, tags),
        })
        .await?;

        let mut message = format!("Diary entry saved for {}", entry.datetime);
        if let Some(tags) = &entry.tags {
            message.push_str(&format!(" [tags: {}]", tags.join(", ")));
        }
        Ok(message)
    }

    #[tool(description = "Search diary entries by keyword, tag and/or inclusive date range.")]
    async fn search_diary(
        &self,
        Parameters(params): Parameters<SearchDiaryParams>,
    ) -> Result<String, String> {
        let start = optional_date(params.start_date.as_deref())?;
        let end = optional_date(params.end_date.as_deref())?;
        let limit = params.limit.unwrap_or(DEFAULT_DIARY_LIMIT).max(1);
        tracing::info!(keyword = ?params.keyword, tag = ?params.tag, ?start, ?end, "search_diary called");

        let diary = Arc::clone(&self.diary);
        let keyword = params.keyword;
        let tag = params.tag;
        let (hits, more) = blocking(move || {
            let mut scan = diary.search(keyword.as_deref(), start, end)?;
            if let Some(tag) = tag.as_deref() {
                scan = scan.with_tag(tag);
            }
            let hits: Vec<_> = scan.by_ref().take(limit).collect();
            let more = scan.next().is_some();
            Ok((hits, more))
        })
        .await?;

        if hits.is_empty() {
            return Ok("No diary entries found".into());
        }
        let mut lines = vec![format!("Found {} diary entries:", hits.len()), String::new()];
        for (_, entry) in &hits {
            let mut line = format!("[{}] {}", entry.datetime, entry.content);
            if let Some(tags) = &entry.tags {
                line.push_str(&format!(" (tags: {})", tags.join(", ")));
            }
            lines.push(line);
        }
        if more {
            lines.push(format!("... more entries exist; showing the first {limit}"));
        }
        Ok(lines.join("\n"))
    }

    #[tool(description = "Get the current local date, time and weekday. Use it to turn relative phrases like 'yesterday 3pm' into absolute timestamps.")]
    async fn current_time(&self) -> Result<String, String> {
        tracing::debug!("current_time called");
        Ok(time::current_time_info(time::now()))
    }
}

fn prompt_result(description: &str, text: String) -> GetPromptResult {
    GetPromptResult {
        description: Some(description.into()),
        messages: vec![PromptMessage::new_text(PromptMessageRole::User, text)],
    }
}

#[prompt_router]
impl DaybookTools {
    #[prompt(
        name = "daily-review",
        description = "Review one day's finances, todos, health and diary (date defaults to today)"
    )]
    async fn daily_review(&self, Parameters(args): Parameters<DailyReviewArgs>) -> GetPromptResult {
        tracing::info!(prompt = prompts::DAILY_REVIEW, "get_prompt called");
        prompt_result(
            "Review a day's activity",
            prompts::daily_review(&args, time::today()),
        )
    }

    #[prompt(
        name = "weekly-planning",
        description = "Plan the coming week from the last seven days of data (focus defaults to general productivity)"
    )]
    async fn weekly_planning(
        &self,
        Parameters(args): Parameters<WeeklyPlanningArgs>,
    ) -> GetPromptResult {
        tracing::info!(prompt = prompts::WEEKLY_PLANNING, "get_prompt called");
        prompt_result("Plan the coming week", prompts::weekly_planning(&args))
    }

    #[prompt(
        name = "financial-analysis",
        description = "Analyze income and expenses over a period such as 'last month'"
    )]
    async fn financial_analysis(
        &self,
        Parameters(args): Parameters<FinancialAnalysisArgs>,
    ) -> Result<GetPromptResult, ErrorData> {
        tracing::info!(prompt = prompts::FINANCIAL_ANALYSIS, "get_prompt called");
        let text = prompts::financial_analysis(&args)
            .map_err(|e| ErrorData::invalid_params(e.to_string(), None))?;
        Ok(prompt_result("Analyze income and expenses", text))
    }

    #[prompt(
        name = "health-checkup",
        description = "Review health metrics and trends (metric_type defaults to all, days to 30)"
    )]
    async fn health_checkup(
        &self,
        Parameters(args): Parameters<HealthCheckupArgs>,
    ) -> GetPromptResult {
        tracing::info!(prompt = prompts::HEALTH_CHECKUP, "get_prompt called");
        prompt_result("Review health metrics", prompts::health_checkup(&args))
    }
}

#[tool_handler]
#[prompt_handler]
impl ServerHandler for DaybookTools {
    fn get_info(&self) -> rmcp::model::ServerInfo {
        rmcp::model::ServerInfo {
            instructions: Some(
                "Daybook is a personal data log. Record expenses, income, todos, health \
                 metrics and diary entries with the record_*/add_* tools, query them with \
                 query_finance, query_health, list_todos and search_diary, and read \
                 daybook://summary/today or daybook://summary/weekly for digests. \
                 The daily-review, weekly-planning, financial-analysis and \
                 health-checkup prompts guide a structured review."
                    .into(),
            ),
            capabilities: rmcp::model::ServerCapabilities::builder()
                .enable_tools()
                .enable_prompts()
                .enable_resources()
                .build(),
            ..Default::default()
        }
    }

    async fn list_resources(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListResourcesResult, ErrorData> {
        let listed = resources::LISTED
            .iter()
            .map(|(uri, name, description)| {
                let mut resource = RawResource::new(*uri, name.to_string());
                resource.description = Some(description.to_string());
                resource.mime_type = Some("text/plain".into());
                resource.no_annotation()
            })
            .collect();
        Ok(ListResourcesResult::with_all_items(listed))
    }

    async fn read_resource(
        &self,
        request: ReadResourceRequestParams,
        _context: RequestContext<RoleServer>,
    ) -> Result<ReadResourceResult, ErrorData> {
        let uri = request.uri;
        tracing::info!(%uri, "read_resource called");

        let db = Arc::clone(&self.db);
        let diary = Arc::clone(&self.diary);
        let target = uri.clone();
        let text = tokio::task::spawn_blocking(move || {
            resources::read(&target, &db, &diary, time::today())
        })
        .await
        .map_err(|e| ErrorData::internal_error(format!("summary task failed: {e}"), None))?
        .map_err(|e| match e {
            Error::NotFound(msg) => ErrorData::resource_not_found(msg, None),
            other => ErrorData::internal_error(other.to_string(), None),
        })?;

        Ok(ReadResourceResult {
            contents: vec![ResourceContents::text(text, uri)],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn tools() -> (TempDir, DaybookTools) {
        let dir = TempDir::new().unwrap();
        let db = Database::open(dir.path().join("data.db")).unwrap().shared();
        let diary = DiaryStore::open(dir.path().join("diary")).unwrap().shared();
        (dir, DaybookTools::new(db, diary))
    }

    #[tokio::test]
    async fn expense_then_sql_query() {
        let (_dir, tools) = tools();
        let msg = tools
            .record_expense(Parameters(RecordExpenseParams {
                amount: 35.0,
                category: "lunch".into(),
                note: None,
                date: Some("2024-01-15".into()),
            }))
            .await
            .unwrap();
        assert_eq!(msg, "Recorded expense #1 on 2024-01-15: 35.00 (lunch)");

        let table = tools
            .query_finance(Parameters(QueryFinanceParams {
                sql: Some("SELECT id, amount FROM finance WHERE id = 1".into()),
                ..Default::default()
            }))
            .await
            .unwrap();
        assert!(table.starts_with("id | amount\n"));
        assert!(table.contains("1 | 35"));
    }

    #[tokio::test]
    async fn errors_become_text() {
        let (_dir, tools) = tools();
        let err = tools
            .record_expense(Parameters(RecordExpenseParams {
                amount: -1.0,
                category: "food".into(),
                note: None,
                date: None,
            }))
            .await
            .unwrap_err();
        assert!(err.starts_with("Error: amount must be a positive number"));

        let err = tools
            .query_finance(Parameters(QueryFinanceParams {
                sql: Some("DELETE FROM finance".into()),
                ..Default::default()
            }))
            .await
            .unwrap_err();
        assert!(err.starts_with("Error: invalid query:"));

        let err = tools
            .add_todo(Parameters(AddTodoParams {
                content: "x".into(),
                topic: None,
                due_date: Some("next friday".into()),
            }))
            .await
            .unwrap_err();
        assert!(err.contains("expected YYYY-MM-DD"));
    }

    #[tokio::test]
    async fn complete_todo_requires_exactly_one_target() {
        let (_dir, tools) = tools();
        let err = tools
            .complete_todo(Parameters(CompleteTodoParams::default()))
            .await
            .unwrap_err();
        assert_eq!(err, "Error: provide todo_id or content_match");

        tools
            .add_todo(Parameters(AddTodoParams {
                content: "buy milk".into(),
                topic: None,
                due_date: None,
            }))
            .await
            .unwrap();
        let msg = tools
            .complete_todo(Parameters(CompleteTodoParams {
                todo_id: None,
                content_match: Some("MILK".into()),
            }))
            .await
            .unwrap();
        assert_eq!(msg, "Completed todo #1: buy milk");

        let listed = tools
            .list_todos(Parameters(ListTodosParams {
                status: Some("completed".into()),
                ..Default::default()
            }))
            .await
            .unwrap();
        assert!(listed.contains("[x] #1 buy milk"));
    }

    #[tokio::test]
    async fn diary_round_trip_through_tools() {
        let (_dir, tools) = tools();
        let msg = tools
            .add_diary_entry(Parameters(AddDiaryEntryParams {
                content: "Ran along the river".into(),
                datetime: Some("2024-01-15 07:30:00".into()),
                date: None,
                tags: Some(vec!["running".into()]),
            }))
            .await
            .unwrap();
        assert_eq!(msg, "Diary entry saved for 2024-01-15 07:30:00 [tags: running]");

        let found = tools
            .search_diary(Parameters(SearchDiaryParams {
                keyword: Some("river".into()),
                tag: Some("Running".into()),
                ..Default::default()
            }))
            .await
            .unwrap();
        assert!(found.contains("[2024-01-15 07:30:00] Ran along the river (tags: running)"));

        let none = tools
            .search_diary(Parameters(SearchDiaryParams {
                keyword: Some("river".into()),
                start_date: Some("2024-02-01".into()),
                ..Default::default()
            }))
            .await
            .unwrap();
        assert_eq!(none, "No diary entries found");
    }

    #[tokio::test]
    async fn health_structured_query() {
        let (_dir, tools) = tools();
        let today = time::format_date(time::today());
        tools
            .record_health(Parameters(RecordHealthParams {
                metric_type: "heart_rate".into(),
                value: "62".into(),
                unit: None,
                note: Some("resting".into()),
                date: Some(today.clone()),
            }))
            .await
            .unwrap();

        let text = tools
            .query_health(Parameters(QueryHealthParams {
                metric_type: Some("heart_rate".into()),
                days: Some(7),
                ..Default::default()
            }))
            .await
            .unwrap();
        assert!(text.starts_with("Heart Rate Records (last 7 days):"));
        assert!(text.contains(&format!("{today}: 62 bpm (resting)")));
    }

    #[tokio::test]
    async fn current_time_mentions_yesterday() {
        let (_dir, tools) = tools();
        let text = tools.current_time().await.unwrap();
        assert!(text.starts_with("Current Time Information:"));
        assert!(text.contains("Yesterday: "));
    }

    fn prompt_text(result: &GetPromptResult) -> &str {
        match &result.messages[0].content {
            rmcp::model::PromptMessageContent::Text { text } => text,
            other => panic!("unexpected prompt content: {other:?}"),
        }
    }

    #[test]
    fn four_prompts_are_listed() {
        let (_dir, tools) = tools();
        let mut names: Vec<String> = tools
            .prompt_router
            .list_all()
            .into_iter()
            .map(|p| p.name)
            .collect();
        names.sort();
        assert_eq!(
            names,
            vec!["daily-review", "financial-analysis", "health-checkup", "weekly-planning"]
        );

        let finance = tools
            .prompt_router
            .list_all()
            .into_iter()
            .find(|p| p.name == prompts::FINANCIAL_ANALYSIS)
            .unwrap();
        let args = finance.arguments.unwrap();
        assert_eq!(args[0].name, "period");
        assert_eq!(args[0].required, Some(true));
    }

    #[tokio::test]
    async fn prompts_fill_in_defaults() {
        let (_dir, tools) = tools();

        let daily = tools.daily_review(Parameters(DailyReviewArgs::default())).await;
        assert_eq!(daily.messages.len(), 1);
        let today = time::format_date(time::today());
        assert!(prompt_text(&daily).contains(&format!("review my day: {today}")));

        let health = tools
            .health_checkup(Parameters(HealthCheckupArgs::default()))
            .await;
        assert!(prompt_text(&health).contains("Metric: all. Period: the last 30 days."));

        let err = tools
            .financial_analysis(Parameters(FinancialAnalysisArgs::default()))
            .await
            .unwrap_err();
        assert_eq!(err.code, rmcp::model::ErrorCode::INVALID_PARAMS);
    }
}
