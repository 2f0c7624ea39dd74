use daybook::db::schema::TABLES;
use daybook::db::Database;
use tempfile::TempDir;

#[test]
fn open_creates_new_db_at_nonexistent_path() {
    let tmp = TempDir::new().unwrap();
    let db_path = tmp.path().join("subdir").join("data.db");

    // Should not exist yet
    assert!(!db_path.exists());

    let db = Database::open(&db_path).unwrap();

    // Should have been created
    assert!(db_path.exists());
    assert_eq!(db.path(), Some(db_path.as_path()));

    // Should be functional
    for table in TABLES {
        let result = db
            .query(&format!("SELECT COUNT(*) AS n FROM {table}"), &[])
            .unwrap();
        assert_eq!(result.rows[0].get_i64("n"), Some(0), "{table} should be empty");
    }
}

#[test]
fn reopen_keeps_existing_rows() {
    let tmp = TempDir::new().unwrap();
    let db_path = tmp.path().join("data.db");

    {
        let db = Database::open(&db_path).unwrap();
        db.execute(
            "INSERT INTO todos (content, created_at) VALUES ('survive restart', '2024-01-15 09:00:00')",
            [],
        )
        .unwrap();
    }

    let db = Database::open(&db_path).unwrap();
    let result = db.query("SELECT content FROM todos", &[]).unwrap();
    assert_eq!(result.rows[0].get_str("content"), Some("survive restart"));
}

#[test]
fn busy_timeout_and_wal_are_set() {
    let tmp = TempDir::new().unwrap();
    let db = Database::open(tmp.path().join("test.db")).unwrap();

    let timeout: i64 = db
        .with_conn(|conn| conn.pragma_query_value(None, "busy_timeout", |row| row.get(0)))
        .unwrap();
    assert_eq!(timeout, 5000);

    let mode: String = db
        .with_conn(|conn| conn.pragma_query_value(None, "journal_mode", |row| row.get(0)))
        .unwrap();
    assert_eq!(mode.to_lowercase(), "wal");
}
