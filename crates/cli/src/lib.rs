//! # `feedsync` CLI Library Crate
//!
//! Argument parsing and command handlers for the `feedsync` binary. The
//! `migrate` command wires the SQLite store, the RSS feed source and the
//! HTTP file retriever together and runs one migration.

pub mod config;

use crate::config::{get_config, AppConfig};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use feedsync::{
    migrate, ContentStore, FeedImporter, HttpFileRetriever, ImportMode, ItemErrorPolicy,
    MigrationReport, Reconciler, SqliteProvider,
};
use feedsync_rss::RssFeedSource;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

// --- CLI Argument Structs ---

#[derive(Parser, Debug)]
#[command(name = "feedsync", author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to a YAML config file. Defaults to `feedsync.yml` when present.
    #[arg(long, global = true, env = "FEEDSYNC_CONFIG")]
    pub config: Option<PathBuf>,
    /// Path of the SQLite database.
    #[arg(long, global = true, env = "FEEDSYNC_DB_URL")]
    pub db_url: Option<String>,
    /// Directory that receives downloaded images.
    #[arg(long, global = true, env = "FEEDSYNC_FILES_DIR")]
    pub files_dir: Option<PathBuf>,
    /// What to do with items whose title is already stored.
    #[arg(long, global = true, env = "FEEDSYNC_MODE")]
    pub mode: Option<ImportMode>,
    /// What to do with items that fail to parse.
    #[arg(long, global = true, env = "FEEDSYNC_ON_ITEM_ERROR")]
    pub on_item_error: Option<ItemErrorPolicy>,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Import a feed and delete articles that are no longer in it
    #[command(alias = "xml-migration")]
    Migrate(MigrateArgs),
}

#[derive(Parser, Debug)]
pub struct MigrateArgs {
    /// The feed URL. Its first and last path segments become the tags.
    pub feed_url: String,
}

impl Cli {
    /// Loads the layered configuration and applies the command-line flags
    /// on top of it.
    pub fn resolve_config(&self) -> Result<AppConfig> {
        let mut config = get_config(self.config.as_deref())?;
        if let Some(db_url) = &self.db_url {
            config.db_url = db_url.clone();
        }
        if let Some(files_dir) = &self.files_dir {
            config.files_dir = files_dir.clone();
        }
        if let Some(mode) = self.mode {
            config.mode = mode;
        }
        if let Some(policy) = self.on_item_error {
            config.on_item_error = policy;
        }
        Ok(config)
    }
}

// --- Public Entrypoint ---

/// The main entry point for the `feedsync` library.
pub async fn run(cli: Cli) -> Result<()> {
    let config = cli.resolve_config()?;
    match cli.command {
        Commands::Migrate(args) => {
            let report = handle_migrate(&config, &args.feed_url).await?;
            println!("{report}");
            Ok(())
        }
    }
}

// --- Command Handlers ---

/// Handles the `feedsync migrate` command logic.
pub async fn handle_migrate(config: &AppConfig, feed_url: &str) -> Result<MigrationReport> {
    info!("Starting migration of '{feed_url}' with {config:?}");

    ensure_parent_dir(&config.db_url)?;
    let store = SqliteProvider::new(&config.db_url)
        .await
        .with_context(|| format!("Failed to open database '{}'", config.db_url))?;
    store.initialize_schema().await?;
    info!("Opened {} store at '{}'.", store.name(), config.db_url);

    let settings = config.http_settings();
    let feeds = RssFeedSource::new(&settings)?;
    let files = HttpFileRetriever::new(&config.files_dir, Box::new(store.clone()), &settings)?;
    let importer = FeedImporter::new(&store, &feeds, &files, config.import_options());
    let reconciler = Reconciler::new(&store);

    let report = migrate(&importer, &reconciler, feed_url).await?;
    Ok(report)
}

fn ensure_parent_dir(db_url: &str) -> Result<()> {
    if db_url == ":memory:" {
        return Ok(());
    }
    if let Some(parent) = Path::new(db_url).parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create database directory '{}'", parent.display())
            })?;
        }
    }
    Ok(())
}
