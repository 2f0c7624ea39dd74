//! Prompt templates offered to MCP clients.
//!
//! Each prompt renders a single user message that walks the agent through a
//! review using daybook's own tools. Optional arguments fall back to
//! defaults; a blank value counts as missing.

use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::records::health::DEFAULT_QUERY_DAYS;
use crate::time;

pub const DAILY_REVIEW: &str = "daily-review";
pub const WEEKLY_PLANNING: &str = "weekly-planning";
pub const FINANCIAL_ANALYSIS: &str = "financial-analysis";
pub const HEALTH_CHECKUP: &str = "health-checkup";

pub const DEFAULT_FOCUS: &str = "general productivity";
pub const DEFAULT_METRIC: &str = "all";

#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct DailyReviewArgs {
    /// Date to review (YYYY-MM-DD), defaults to today
    pub date: Option<String>,
}

#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct WeeklyPlanningArgs {
    /// Main focus for the week, e.g. "work" or "health"
    pub focus: Option<String>,
}

#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct FinancialAnalysisArgs {
    /// Period to analyze, e.g. "last month", "last 3 months", "2024"
    pub period: String,
}

#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct HealthCheckupArgs {
    /// Metric to focus on, or "all"
    pub metric_type: Option<String>,
    /// Number of days to look back (default 30)
    pub days: Option<String>,
}

fn or_default<'a>(value: Option<&'a str>, default: &'a str) -> &'a str {
    value.map(str::trim).filter(|v| !v.is_empty()).unwrap_or(default)
}

pub fn daily_review(args: &DailyReviewArgs, today: NaiveDate) -> String {
    let today = time::format_date(today);
    let date = or_default(args.date.as_deref(), &today);
    format!(
        "Help me review my day: {date}.

1. Gather the day's data:
   - expenses and income with query_finance (start_date and end_date = {date})
   - completed and pending todos with list_todos
   - health readings with query_health
   - diary entries with search_diary (start_date and end_date = {date})
   The daybook://summary/{date} resource has a ready-made digest.

2. Point out what stands out:
   - unusual spending or categories that dominate
   - how many todos got done versus how many are still open
   - health readings that moved noticeably, or metrics not logged
   - notable moments from the diary

3. Suggest what to do next:
   - budget adjustments if spending ran high
   - overdue todos to tackle first
   - health metrics worth recording tomorrow"
    )
}

pub fn weekly_planning(args: &WeeklyPlanningArgs) -> String {
    let focus = or_default(args.focus.as_deref(), DEFAULT_FOCUS);
    format!(
        "Help me plan the coming week. Focus area: {focus}.

1. Look back at the last seven days (daybook://summary/weekly):
   - total income and expenses
   - todos completed versus still pending
   - how consistently health metrics were logged

2. Find carryover:
   - overdue todos (list_todos with include_overdue_reminder)
   - recurring expenses visible in query_finance

3. Plan ahead:
   - ask me what matters most this week
   - propose todos that fit the focus area, with due dates
   - remind me which health metrics to keep tracking"
    )
}

pub fn financial_analysis(args: &FinancialAnalysisArgs) -> Result<String> {
    let period = args.period.trim();
    if period.is_empty() {
        return Err(Error::validation("period is required"));
    }
    Ok(format!(
        "Act as my personal finance assistant and analyze this period: {period}.

1. Income: totals by source and how they changed over the period.
2. Expenses: totals by category, the top categories, and one-off purchases.
3. Overall: net savings (income minus expenses), savings rate, and a
   month-over-month comparison when the period spans several months.
4. Recommendations: where to cut back, per-category budgets, and a
   realistic savings goal.

Use query_finance with SQL over the finance table
(columns: id, type, amount, category, source, note, date, created_at)."
    ))
}

pub fn health_checkup(args: &HealthCheckupArgs) -> String {
    let metric = or_default(args.metric_type.as_deref(), DEFAULT_METRIC);
    let default_days = DEFAULT_QUERY_DAYS.to_string();
    let days = or_default(args.days.as_deref(), &default_days);
    format!(
        "Review my health tracking. Metric: {metric}. Period: the last {days} days.

1. Coverage: which metrics have readings and where the gaps are.
2. Trends: changes over time, averages, minimum and maximum values.
3. Observations: patterns worth noting, possible concerns, improvements.
4. Recommendations: metrics to log more consistently, habits to try, and
   when a reading is worth raising with a doctor.

Use query_health (metric_type and days, or SQL over the health table)."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        time::parse_date(s).unwrap()
    }

    #[test]
    fn daily_review_defaults_to_today() {
        let text = daily_review(&DailyReviewArgs::default(), d("2024-01-15"));
        assert!(text.contains("review my day: 2024-01-15"));
        assert!(text.contains("daybook://summary/2024-01-15"));

        let explicit = DailyReviewArgs {
            date: Some("2024-01-10".into()),
        };
        assert!(daily_review(&explicit, d("2024-01-15")).contains("review my day: 2024-01-10"));
    }

    #[test]
    fn blank_arguments_fall_back_to_defaults() {
        let weekly = weekly_planning(&WeeklyPlanningArgs {
            focus: Some("  ".into()),
        });
        assert!(weekly.contains("Focus area: general productivity."));

        let health = health_checkup(&HealthCheckupArgs::default());
        assert!(health.contains("Metric: all."));
        assert!(health.contains("the last 30 days"));

        let sleep = health_checkup(&HealthCheckupArgs {
            metric_type: Some("sleep".into()),
            days: Some("7".into()),
        });
        assert!(sleep.contains("Metric: sleep."));
        assert!(sleep.contains("the last 7 days"));
    }

    #[test]
    fn financial_analysis_requires_period() {
        let err = financial_analysis(&FinancialAnalysisArgs::default()).unwrap_err();
        assert_eq!(err.kind(), "validation");

        let text = financial_analysis(&FinancialAnalysisArgs {
            period: "last month".into(),
        })
        .unwrap();
        assert!(text.contains("this period: last month."));
    }
}
