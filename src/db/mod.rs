//! Storage engine: the single SQLite connection behind every record module.
//!
//! [`Database`] is constructed once at startup and shared (via `Arc`) with the
//! record modules and the summary aggregator. Record modules never open their
//! own connections; fixed SQL goes through [`Database::execute`] or
//! [`Database::with_conn`], and agent-supplied SQL goes through the guarded
//! [`Database::query`].

pub mod guard;
pub mod rows;
pub mod schema;

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use rusqlite::types::Value;
use rusqlite::{Connection, Params};

use crate::error::{Error, Result};
pub use rows::{QueryResult, Row};

/// Outcome of a non-query statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Executed {
    pub rows_affected: usize,
    /// Rowid of the new row, for an `INSERT`/`REPLACE` that changed something.
    pub last_insert_id: Option<i64>,
}

pub struct Database {
    conn: Mutex<Connection>,
    path: Option<PathBuf>,
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database").field("path", &self.path).finish()
    }
}

impl Database {
    /// Open (or create) the database at `path`, creating parent directories,
    /// and initialize the schema.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }

        let conn = Connection::open(path)?;
        // WAL keeps readers (e.g. `daybook summary`) from blocking the server
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.busy_timeout(Duration::from_millis(5000))?;

        let db = Self {
            conn: Mutex::new(conn),
            path: Some(path.to_path_buf()),
        };
        db.initialize()?;

        tracing::info!(path = %path.display(), "database initialized");
        Ok(db)
    }

    /// Open an in-memory database with the schema applied.
    pub fn open_in_memory() -> Result<Self> {
        let db = Self {
            conn: Mutex::new(Connection::open_in_memory()?),
            path: None,
        };
        db.initialize()?;
        Ok(db)
    }

    /// Wrap for sharing between the tool handler, resources and the aggregator.
    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// File backing this database; `None` for in-memory databases.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Create any missing tables and indexes. Never destructive.
    pub fn initialize(&self) -> Result<()> {
        schema::init_schema(&self.lock())?;
        tracing::debug!("schema ready");
        Ok(())
    }

    /// Run a parametrized insert/update. Values are always bound, never
    /// spliced into the statement text.
    ///
    /// The insert identity is read while the connection is still locked, so it
    /// always belongs to this statement. Record modules that need the whole row
    /// back use `INSERT ... RETURNING` through [`Database::with_conn`] instead.
    pub fn execute<P: Params>(&self, sql: &str, params: P) -> Result<Executed> {
        let conn = self.lock();
        let rows_affected = conn.execute(sql, params)?;

        let inserts = guard::leading_keyword(sql)
            .is_some_and(|k| k.eq_ignore_ascii_case("insert") || k.eq_ignore_ascii_case("replace"));
        let last_insert_id = (inserts && rows_affected > 0).then(|| conn.last_insert_rowid());
        tracing::debug!(rows_affected, ?last_insert_id, "statement executed");

        Ok(Executed {
            rows_affected,
            last_insert_id,
        })
    }

    /// Run a caller-supplied read-only statement.
    ///
    /// Fails with [`Error::InvalidQuery`] unless `sql` is a single `SELECT`;
    /// see [`guard::ensure_single_select`]. As a second line, SQLite itself must
    /// report the prepared statement as read-only.
    pub fn query(&self, sql: &str, params: &[Value]) -> Result<QueryResult> {
        guard::ensure_single_select(sql).inspect_err(|e| {
            tracing::warn!(error = %e, "rejected query");
        })?;

        let conn = self.lock();
        let mut stmt = conn.prepare(sql)?;
        if !stmt.readonly() {
            return Err(Error::invalid_query(sql, "statement would modify the database"));
        }

        let columns: Arc<[String]> = stmt
            .column_names()
            .into_iter()
            .map(String::from)
            .collect::<Vec<_>>()
            .into();
        let width = columns.len();

        let mut rows = stmt.query(rusqlite::params_from_iter(params.iter()))?;
        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            let values = (0..width)
                .map(|i| row.get::<_, Value>(i))
                .collect::<rusqlite::Result<Vec<_>>>()?;
            out.push(Row::new(Arc::clone(&columns), values));
        }

        tracing::debug!(rows = out.len(), "query returned");
        Ok(QueryResult {
            columns: columns.to_vec(),
            rows: out,
        })
    }

    /// Lend the connection to fixed, typed SQL owned by a record module.
    ///
    /// The connection stays locked for the whole closure, so a lookup followed
    /// by a write inside one call cannot interleave with another caller.
    pub fn with_conn<T>(&self, f: impl FnOnce(&Connection) -> rusqlite::Result<T>) -> Result<T> {
        let conn = self.lock();
        Ok(f(&*conn)?)
    }

    fn lock(&self) -> MutexGuard<'_, Connection> {
        // A panic mid-statement leaves SQLite itself consistent, so keep serving.
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
