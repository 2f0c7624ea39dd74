//! Typed record modules over the shared [`Database`](crate::db::Database).
//!
//! Each module owns the fixed SQL for its table and validates input before it
//! reaches SQLite. Raw agent SQL is funneled through the guarded
//! [`Database::query`](crate::db::Database::query) with an extra check that the
//! statement names the module's table.

pub mod finance;
pub mod health;
pub mod todo;
pub mod types;

pub use types::{FinanceKind, FinanceRecord, HealthRecord, TodoRecord, TodoStatus};
