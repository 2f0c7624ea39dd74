mod helpers;

use daybook::records::finance::{self, NewExpense, NewIncome};
use daybook::records::health::{self, HealthQuery, NewHealthMetric};
use daybook::records::todo::{self, Completion, CompletionTarget, NewTodo, StatusFilter, TodoFilter};
use daybook::records::TodoStatus;
use daybook::summary;
use helpers::{date, test_db, test_diary};
use rusqlite::types::Value;

#[test]
fn two_expenses_roll_up_into_the_daily_digest() {
    let db = test_db();
    let (_tmp, diary) = test_diary();

    let mut ids = Vec::new();
    for (amount, category) in [(35.0, "lunch"), (68.0, "books")] {
        let record = finance::record_expense(
            &db,
            NewExpense {
                amount,
                category: category.into(),
                note: None,
                date: Some(date("2024-01-15")),
            },
        )
        .unwrap();
        ids.push(record.id);
    }

    // Confirmation ids are retrievable
    for id in &ids {
        let row = db
            .query("SELECT id FROM finance WHERE id = ?1", &[Value::Integer(*id)])
            .unwrap();
        assert_eq!(row.len(), 1);
    }

    let digest = summary::daily(&db, &diary, date("2024-01-15"), date("2024-01-15"));
    assert_eq!(digest.finance.totals.expense_total, 103.0);
    assert_eq!(digest.finance.totals.expense_count, 2);
    assert_eq!(digest.finance.totals.income_total, 0.0);
    assert_eq!(digest.finance.totals.income_count, 0);
    assert!(digest.render().contains("Expense: -103.00 (2 transactions)"));
}

#[test]
fn completing_by_substring_moves_todo_to_completed_list() {
    let db = test_db();
    todo::add(
        &db,
        NewTodo {
            content: "buy milk".into(),
            ..Default::default()
        },
    )
    .unwrap();

    let completion = todo::complete(&db, CompletionTarget::ContentMatch("milk".into())).unwrap();
    assert!(matches!(completion, Completion::Completed(_)));

    let completed = todo::list(
        &db,
        &TodoFilter {
            topic: None,
            status: StatusFilter::Completed,
        },
    )
    .unwrap();
    assert_eq!(completed.len(), 1);
    assert_eq!(completed[0].content, "buy milk");
    assert_eq!(completed[0].status, TodoStatus::Completed);
    assert!(completed[0].completed_at.is_some());

    let pending = todo::list(&db, &TodoFilter::default()).unwrap();
    assert!(pending.is_empty());
}

#[test]
fn blood_pressure_readings_keep_creation_order_and_digest_shows_latest() {
    let db = test_db();
    let (_tmp, diary) = test_diary();

    for value in ["120/80", "118/76"] {
        health::record(
            &db,
            NewHealthMetric {
                metric_type: "blood_pressure".into(),
                value: value.into(),
                date: Some(date("2024-01-15")),
                ..Default::default()
            },
        )
        .unwrap();
    }

    let result = health::query(
        &db,
        "SELECT value FROM health WHERE metric_type = 'blood_pressure' ORDER BY id",
    )
    .unwrap();
    let values: Vec<&str> = result.rows.iter().filter_map(|r| r.get_str("value")).collect();
    assert_eq!(values, vec!["120/80", "118/76"]);

    let recent = health::recent(
        &db,
        &HealthQuery {
            metric_type: Some("blood_pressure".into()),
            days: 1,
        },
        date("2024-01-15"),
    )
    .unwrap();
    assert_eq!(recent.len(), 2);
    assert_eq!(recent[0].value, "120/80");

    let digest = summary::daily(&db, &diary, date("2024-01-15"), date("2024-01-15"));
    assert_eq!(digest.health.latest.len(), 1);
    assert_eq!(digest.health.latest[0].value, "118/76");
    assert!(digest.render().contains("Blood Pressure: 118/76 mmHg"));
}

#[test]
fn guarded_query_blocks_destructive_sql() {
    let db = test_db();
    finance::record_expense(
        &db,
        NewExpense {
            amount: 9.99,
            category: "music".into(),
            note: None,
            date: None,
        },
    )
    .unwrap();

    for sql in [
        "DELETE FROM finance",
        "DROP TABLE todos",
        "SELECT 1; DELETE FROM finance",
    ] {
        assert_eq!(db.query(sql, &[]).unwrap_err().kind(), "invalid_query");
    }

    let rows = db
        .query("SELECT * FROM finance WHERE type='expense'", &[])
        .unwrap();
    assert_eq!(rows.len(), 1);
}

fn count(db: &daybook::db::Database, table: &str) -> i64 {
    db.query(&format!("SELECT COUNT(*) AS n FROM {table}"), &[])
        .unwrap()
        .rows[0]
        .get_i64("n")
        .unwrap()
}

#[test]
fn interleaved_inserts_return_their_own_ids() {
    let db = test_db();

    let lunch = finance::record_expense(
        &db,
        NewExpense {
            amount: 35.0,
            category: "lunch".into(),
            ..Default::default()
        },
    )
    .unwrap();
    let milk = todo::add(
        &db,
        NewTodo {
            content: "buy milk".into(),
            ..Default::default()
        },
    )
    .unwrap();
    let weight = health::record(
        &db,
        NewHealthMetric {
            metric_type: "weight".into(),
            value: "70".into(),
            ..Default::default()
        },
    )
    .unwrap();
    let salary = finance::record_income(
        &db,
        NewIncome {
            amount: 3000.0,
            source: "salary".into(),
            ..Default::default()
        },
    )
    .unwrap();
    let call = todo::add(
        &db,
        NewTodo {
            content: "call mom".into(),
            ..Default::default()
        },
    )
    .unwrap();

    assert_eq!((lunch.id, salary.id), (1, 2));
    assert_eq!((milk.id, call.id), (1, 2));
    assert_eq!(weight.id, 1);

    let row = |sql: &str, id: i64, column: &str| -> Option<String> {
        db.query(sql, &[Value::Integer(id)])
            .unwrap()
            .rows
            .first()
            .and_then(|r| r.get_str(column).map(String::from))
    };
    assert_eq!(
        row("SELECT category FROM finance WHERE id = ?1", lunch.id, "category").as_deref(),
        Some("lunch")
    );
    assert_eq!(
        row("SELECT source FROM finance WHERE id = ?1", salary.id, "source").as_deref(),
        Some("salary")
    );
    assert_eq!(
        row("SELECT content FROM todos WHERE id = ?1", call.id, "content").as_deref(),
        Some("call mom")
    );
    assert_eq!(
        row("SELECT value FROM health WHERE id = ?1", weight.id, "value").as_deref(),
        Some("70")
    );

    assert_eq!(todo::get(&db, milk.id).unwrap().unwrap().content, "buy milk");
    assert_eq!(health::get(&db, weight.id).unwrap().unwrap().unit.as_deref(), Some("kg"));
    assert_eq!(finance::get(&db, salary.id).unwrap().unwrap().amount, 3000.0);
}

#[test]
fn failed_inserts_leave_no_rows_behind() {
    let db = test_db();
    finance::record_expense(
        &db,
        NewExpense {
            amount: 12.0,
            category: "coffee".into(),
            ..Default::default()
        },
    )
    .unwrap();

    let bad_expense = finance::record_expense(
        &db,
        NewExpense {
            amount: -5.0,
            category: "coffee".into(),
            ..Default::default()
        },
    );
    assert_eq!(bad_expense.unwrap_err().kind(), "validation");
    assert_eq!(todo::add(&db, NewTodo::default()).unwrap_err().kind(), "validation");

    assert_eq!(count(&db, "finance"), 1);
    assert_eq!(count(&db, "todos"), 0);

    // A storage failure surfaces as storage, not as a missing record
    db.with_conn(|conn| conn.execute_batch("DROP TABLE health")).unwrap();
    let err = health::record(
        &db,
        NewHealthMetric {
            metric_type: "sleep".into(),
            value: "7.5".into(),
            ..Default::default()
        },
    )
    .unwrap_err();
    assert_eq!(err.kind(), "storage");

    let next = todo::add(
        &db,
        NewTodo {
            content: "still works".into(),
            ..Default::default()
        },
    )
    .unwrap();
    assert_eq!(next.id, 1);
    assert_eq!(count(&db, "todos"), 1);
}
