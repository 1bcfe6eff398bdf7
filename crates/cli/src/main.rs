use anyhow::Result;
use clap::{Parser, Subcommand};
use pathbot_core::env_config::env_optional;
use pathbot_storage::{Storage, Store};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "pathbot")]
#[command(about = "Community bot for curriculum paths and weekly task tracking", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP command surface for the chat gateway
    Serve {
        #[arg(short, long, default_value = "8080")]
        port: u16,
        #[arg(short = 'H', long, default_value = "127.0.0.1")]
        host: String,
    },
    /// Print all paths as JSON
    Paths,
    /// Print command usage counts
    Metrics {
        /// last_7_days, last_30_days, all or custom
        #[arg(short, long, default_value = "all")]
        period: String,
        /// Start of a custom period (YYYY-MM-DD)
        #[arg(short, long)]
        start_date: Option<String>,
        /// Group by channels or paths
        #[arg(short, long)]
        by: Option<String>,
    },
    /// Print completed and pending task counts for the recorded members of a channel
    Summary {
        #[arg(short, long)]
        channel: String,
    },
}

pub(crate) fn get_db_path() -> PathBuf {
    env_optional("PATHBOT_DB_PATH").map_or_else(
        || {
            dirs::data_local_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("pathbot")
                .join("pathbot.db")
        },
        PathBuf::from,
    )
}

pub(crate) fn ensure_db_dir(db_path: &Path) -> Result<()> {
    if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    Ok(())
}

pub(crate) fn open_store() -> Result<Arc<dyn Store>> {
    let db_path = get_db_path();
    ensure_db_dir(&db_path)?;
    tracing::debug!(path = %db_path.display(), "opening curriculum store");
    Ok(Arc::new(Storage::new(&db_path)?))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { port, host } => commands::serve::run(port, host).await,
        Commands::Paths => commands::reports::run_paths().await,
        Commands::Metrics { period, start_date, by } => {
            commands::reports::run_metrics(&period, start_date.as_deref(), by.as_deref()).await
        },
        Commands::Summary { channel } => commands::reports::run_summary(&channel).await,
    }
}
