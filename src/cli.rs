//! Command-line interface

use crate::api;
use crate::client::TranslationClient;
use crate::config::Config;
use crate::db::{Database, KeyValueStore};
use crate::history::HistoryStore;
use crate::languages::{self, SUPPORTED_LANGUAGES};
use crate::preferences::PreferenceStore;
use crate::services::{model, CredentialSelector, TranslationPipeline};
use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;

/// Source language value that asks the server to detect the language
const AUTO_DETECT: &str = "auto";

#[derive(Parser)]
#[command(name = "verba", version, about = "LLM-backed text translation")]
pub struct Cli {
    /// Path to the configuration file
    #[arg(long, global = true, default_value = "verba.toml")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP translation server
    Serve,
    /// Translate text through the server
    Translate {
        text: String,
        /// Source language code, or "auto"
        #[arg(long, short = 'f')]
        from: Option<String>,
        /// Target language code
        #[arg(long, short = 't')]
        to: Option<String>,
    },
    /// Detect the language of text
    Detect { text: String },
    /// Manage translation history
    History {
        #[command(subcommand)]
        action: HistoryAction,
    },
    /// Show or change the remembered language pair
    Prefs {
        #[command(subcommand)]
        action: PrefsAction,
    },
    /// List supported languages
    Languages,
}

#[derive(Subcommand)]
pub enum HistoryAction {
    List,
    Delete { id: String },
    Clear,
}

#[derive(Subcommand)]
pub enum PrefsAction {
    Show,
    Set { source: String, target: String },
}

/// Execute a parsed command
pub async fn run(command: Command, config: Config) -> Result<()> {
    match command {
        Command::Serve => serve(config).await,
        Command::Translate { text, from, to } => translate(&config, &text, from, to).await,
        Command::Detect { text } => {
            let client = TranslationClient::new(&config.client.server_url, open_db(&config).await?);
            println!("{}", client.detect(&text).await);
            Ok(())
        }
        Command::History { action } => history(&config, action).await,
        Command::Prefs { action } => prefs(&config, action).await,
        Command::Languages => {
            for lang in SUPPORTED_LANGUAGES {
                println!(
                    "{} {}  {} ({})",
                    lang.flag.unwrap_or(" "),
                    lang.code,
                    lang.name,
                    lang.native_name
                );
            }
            Ok(())
        }
    }
}

async fn serve(config: Config) -> Result<()> {
    let credentials = CredentialSelector::from_process_env();
    let prefix = model::key_prefix(config.model.provider);
    let key_count = credentials.keys(prefix).map(|keys| keys.len()).unwrap_or(0);

    info!("Model provider: {}", config.model.provider.as_str());
    info!("Model: {} at {}", config.model.model(), config.model.api_url());
    info!("{} API keys configured under {}", key_count, prefix);

    let model = model::build(&config.model, credentials);
    let pipeline = TranslationPipeline::new(model)?;

    api::serve(&config, pipeline).await
}

async fn open_db(config: &Config) -> Result<Database> {
    let db = Database::new(&config.database.path)
        .await
        .with_context(|| format!("Failed to open database {}", config.database.path))?;
    db.migrate().await?;
    Ok(db)
}

fn locale() -> Option<String> {
    std::env::var("LC_ALL")
        .or_else(|_| std::env::var("LANG"))
        .ok()
        .filter(|l| !l.is_empty())
}

async fn translate(config: &Config, text: &str, from: Option<String>, to: Option<String>) -> Result<()> {
    let db = open_db(config).await?;
    let prefs = PreferenceStore::new(db.clone());
    let client = TranslationClient::new(&config.client.server_url, db);

    let translated = translate_text(&client, &prefs, locale().as_deref(), text, from, to).await?;
    println!("{}", translated);
    Ok(())
}

/// Resolve the language pair, translate, and remember the pair on success
async fn translate_text<S: KeyValueStore, P: KeyValueStore>(
    client: &TranslationClient<S>,
    prefs: &PreferenceStore<P>,
    locale: Option<&str>,
    text: &str,
    from: Option<String>,
    to: Option<String>,
) -> Result<String> {
    let stored = prefs.load(locale).await;
    let mut source = from.unwrap_or(stored.source);
    let target = to.unwrap_or(stored.target);

    if source == AUTO_DETECT {
        source = client.detect(text).await;
        info!("Detected source language: {}", source);
    }
    if !languages::is_supported(&source) {
        bail!("Unsupported source language: {}", source);
    }
    if !languages::is_supported(&target) {
        bail!("Unsupported target language: {}", target);
    }

    let result = client.translate(text, &source, &target).await;
    if let Some(error) = result.error.filter(|e| !e.is_empty()) {
        bail!("Translation failed: {}", error);
    }

    prefs.store(&source, &target).await;
    Ok(result.translated_text)
}

async fn history(config: &Config, action: HistoryAction) -> Result<()> {
    let history = HistoryStore::new(open_db(config).await?);

    match action {
        HistoryAction::List => {
            for entry in history.list().await {
                let when = chrono::DateTime::from_timestamp_millis(entry.timestamp)
                    .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                    .unwrap_or_default();
                println!(
                    "{}  [{}] {} -> {}\n  {}\n  {}",
                    entry.id,
                    when,
                    entry.source_language,
                    entry.target_language,
                    entry.source_text,
                    entry.translated_text
                );
            }
        }
        HistoryAction::Delete { id } => history.delete_by_id(&id).await,
        HistoryAction::Clear => history.clear().await,
    }

    Ok(())
}

async fn prefs(config: &Config, action: PrefsAction) -> Result<()> {
    let prefs = PreferenceStore::new(open_db(config).await?);

    match action {
        PrefsAction::Show => {
            let current = prefs.load(locale().as_deref()).await;
            println!("{} -> {}", current.source, current.target);
        }
        PrefsAction::Set { source, target } => {
            for code in [&source, &target] {
                if !languages::is_supported(code) {
                    bail!("Unsupported language: {}", code);
                }
            }
            prefs.store(&source, &target).await;
        }
    }

    Ok(())
}
