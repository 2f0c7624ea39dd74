//! Error type shared by the storage engine, diary store, record modules and
//! aggregator.
//!
//! Every variant renders as a human-readable sentence; the MCP tool layer
//! forwards [`Error`]'s `Display` output to the agent unchanged.

use std::path::PathBuf;

use thiserror::Error;

/// Result alias used throughout the core.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// A domain constraint was violated (non-positive amount, blank content,
    /// malformed date, ...).
    #[error("{0}")]
    Validation(String),

    /// A caller-supplied statement is not a single read-only SELECT.
    #[error("invalid query: {reason} (statement: {statement})")]
    InvalidQuery { statement: String, reason: String },

    /// The target of an operation does not exist.
    #[error("{0}")]
    NotFound(String),

    /// SQLite failed (disk full, permission denied, malformed SQL, ...).
    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    /// Filesystem failure while touching a diary file or directory.
    #[error("i/o error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A diary file exists but cannot be decoded.
    #[error("corrupt diary file {}: {reason}", .path.display())]
    Corrupt { path: PathBuf, reason: String },
}

impl Error {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn invalid_query(statement: &str, reason: impl Into<String>) -> Self {
        Self::InvalidQuery {
            statement: statement.trim().to_string(),
            reason: reason.into(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Stable short code for logs and tests.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::InvalidQuery { .. } => "invalid_query",
            Self::NotFound(_) => "not_found",
            Self::Storage(_) => "storage",
            Self::Io { .. } => "io",
            Self::Corrupt { .. } => "corrupt",
        }
    }
}
