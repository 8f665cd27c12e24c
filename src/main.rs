//! Verba - LLM-backed text translation
//!
//! `verba serve` runs the HTTP API; the other subcommands are a client that
//! talks to it and keeps a local translation history.

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use verba::cli::{self, Cli};
use verba::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists
    let dotenv_loaded = std::path::Path::new(".env").exists();
    if dotenv_loaded {
        dotenvy::dotenv()?;
    }

    // Initialize logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if dotenv_loaded {
        info!("Loaded environment variables from .env file");
    }

    let cli = Cli::parse();
    let config = Config::load_from(&cli.config)?;

    cli::run(cli.command, config).await
}
