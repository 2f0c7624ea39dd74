//! Personal data logging for AI agents, over MCP.
//!
//! Daybook is an [MCP](https://modelcontextprotocol.io/) server that lets an agent record
//! and query everyday personal data. Four record types are kept, with two persistence
//! strategies:
//!
//! | Record | Storage | Written by | Read by |
//! |--------|---------|------------|---------|
//! | **Finance** | SQLite `finance` | `record_expense`, `record_income` | `query_finance` |
//! | **Todo** | SQLite `todos` | `add_todo`, `complete_todo` | `list_todos` |
//! | **Health** | SQLite `health` | `record_health` | `query_health` |
//! | **Diary** | `diary/YYYY-MM-DD.json` | `add_diary_entry` | `search_diary` |
//!
//! Cross-record digests are exposed as the `daybook://summary/today`,
//! `daybook://summary/weekly` and `daybook://summary/YYYY-MM-DD` resources, and
//! four review prompts (`daily-review`, `weekly-planning`, `financial-analysis`,
//! `health-checkup`) are offered to clients.
//!
//! # Architecture
//!
//! - **Storage**: one SQLite file behind a mutex-guarded connection, with an allow-list
//!   guard in front of every agent-supplied query
//! - **Diary**: one JSON document per day, rewritten atomically on append
//! - **Transport**: MCP over stdio
//!
//! # Modules
//!
//! - [`config`]: Configuration loading from TOML files and environment variables
//! - [`db`]: SQLite connection, schema and the guarded read-only query path
//! - [`diary`]: Date-partitioned diary store and lazy entry scans
//! - [`prompts`]: Review prompt templates and their argument defaults
//! - [`records`]: Finance, todo and health validation, storage and queries
//! - [`summary`]: Daily and weekly digests across every record type
//! - [`tools`]: The MCP tool handler

pub mod config;
pub mod db;
pub mod diary;
pub mod error;
pub mod prompts;
pub mod records;
pub mod resources;
pub mod server;
pub mod summary;
pub mod time;
pub mod tools;
