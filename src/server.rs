//! MCP server initialization for the stdio transport.
//!
//! [`serve_stdio`] wires the database, the diary store and the MCP tool
//! handler into a running server.

use crate::config::DaybookConfig;
use crate::db::Database;
use crate::diary::DiaryStore;
use crate::tools::DaybookTools;
use anyhow::{Context, Result};
use rmcp::ServiceExt;
use std::sync::Arc;

/// Shared setup: open the database and the diary store.
pub fn setup_shared_state(config: &DaybookConfig) -> Result<(Arc<Database>, Arc<DiaryStore>)> {
    let db_path = config.resolved_db_path();
    let db = Database::open(&db_path)
        .with_context(|| format!("failed to open database at {}", db_path.display()))?;
    tracing::info!(db = %db_path.display(), "database ready");

    let diary_dir = config.resolved_diary_dir();
    let diary = DiaryStore::open(&diary_dir)
        .with_context(|| format!("failed to open diary directory {}", diary_dir.display()))?;

    Ok((db.shared(), diary.shared()))
}

/// Start the MCP server over stdio transport.
pub async fn serve_stdio(config: DaybookConfig) -> Result<()> {
    tracing::info!("starting daybook MCP server on stdio");

    let (db, diary) = setup_shared_state(&config)?;

    let tools = DaybookTools::new(db, diary);
    let transport = rmcp::transport::stdio();

    let server = tools.serve(transport).await?;
    tracing::info!("MCP server running, waiting for client");

    server.waiting().await?;
    tracing::info!("MCP server shut down");

    Ok(())
}
