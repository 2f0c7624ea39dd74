mod cli;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use daybook::config::DaybookConfig;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "daybook", version, about = "Personal data-logging MCP server")]
struct Cli {
    /// Config file (defaults to ~/.daybook/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start the MCP server (stdio transport)
    Serve {
        /// Override the database file
        #[arg(long)]
        db_path: Option<String>,
        /// Override the diary directory
        #[arg(long)]
        diary_path: Option<String>,
    },
    /// Print a daily or weekly digest
    Summary {
        /// Date to summarize (YYYY-MM-DD), defaults to today
        #[arg(long, conflicts_with = "weekly")]
        date: Option<String>,
        /// Summarize the last seven days instead
        #[arg(long)]
        weekly: bool,
        /// Print the digest as JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Export all records and diary entries as JSON to stdout
    Export,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load config (for log level and storage paths)
    let mut config = match &cli.config {
        Some(path) => DaybookConfig::load_from(path)?,
        None => DaybookConfig::load()?,
    };

    // Log to stderr so stdout stays clean for MCP JSON-RPC.
    let filter = EnvFilter::try_new(&config.server.log_level)
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Serve {
            db_path,
            diary_path,
        } => {
            if let Some(path) = db_path {
                config.storage.db_path = path;
            }
            if let Some(path) = diary_path {
                config.storage.diary_dir = path;
            }
            daybook::server::serve_stdio(config).await?;
        }
        Command::Summary { date, weekly, json } => {
            cli::summary::summary(&config, date.as_deref(), weekly, json)?;
        }
        Command::Export => {
            cli::export::export(&config)?;
        }
    }

    Ok(())
}
