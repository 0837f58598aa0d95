//! # Application Configuration
//!
//! Loads the settings for a migration run from, in increasing priority:
//! built-in defaults, an optional YAML file and `FEEDSYNC_`-prefixed
//! environment variables. Command-line flags are applied on top by the
//! caller.

use config::{Config as ConfigBuilder, Environment, File, FileFormat};
use feedsync::constants::{
    DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_DB_FILE, DEFAULT_FILES_DIR,
    DEFAULT_REQUEST_TIMEOUT_SECS,
};
use feedsync::{HttpSettings, ImportMode, ImportOptions, ItemErrorPolicy};
use regex::Regex;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::info;

/// The file looked up in the working directory when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "feedsync.yml";

/// A custom error type for configuration issues.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration error: {0}")]
    General(String),
    #[error("Config file not found at '{0}'")]
    NotFound(String),
}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::General(err.to_string())
    }
}

/// The root configuration structure, mapping directly to `feedsync.yml`.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Path of the SQLite database. `FEEDSYNC_DB_URL`.
    #[serde(default = "default_db_url")]
    pub db_url: String,
    /// Root of the managed files directory. `FEEDSYNC_FILES_DIR`.
    #[serde(default = "default_files_dir")]
    pub files_dir: PathBuf,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default)]
    pub mode: ImportMode,
    #[serde(default)]
    pub on_item_error: ItemErrorPolicy,
}

fn default_db_url() -> String {
    DEFAULT_DB_FILE.to_string()
}

fn default_files_dir() -> PathBuf {
    PathBuf::from(DEFAULT_FILES_DIR)
}

fn default_connect_timeout_secs() -> u64 {
    DEFAULT_CONNECT_TIMEOUT_SECS
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_url: default_db_url(),
            files_dir: default_files_dir(),
            connect_timeout_secs: default_connect_timeout_secs(),
            request_timeout_secs: default_request_timeout_secs(),
            mode: ImportMode::default(),
            on_item_error: ItemErrorPolicy::default(),
        }
    }
}

impl AppConfig {
    pub fn http_settings(&self) -> HttpSettings {
        HttpSettings {
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
        }
    }

    pub fn import_options(&self) -> ImportOptions {
        ImportOptions {
            mode: self.mode,
            on_item_error: self.on_item_error,
        }
    }
}

/// Reads a file and replaces `${VAR}` references with values from the
/// environment. Unset variables become empty strings.
///
/// Returns `Ok(None)` if the file does not exist.
fn read_and_substitute(path: &Path) -> Result<Option<String>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(path).map_err(|e| {
        ConfigError::General(format!(
            "Failed to read config file '{}': {e}",
            path.display()
        ))
    })?;

    let re = Regex::new(r"\$\{(?P<var>[A-Z0-9_]+)\}")
        .map_err(|e| ConfigError::General(e.to_string()))?;
    let expanded = re.replace_all(&content, |caps: &regex::Captures| {
        env::var(&caps["var"]).unwrap_or_default()
    });

    Ok(Some(expanded.into_owned()))
}

/// Loads the application configuration.
///
/// An explicit `config_path` must exist. Without one, `feedsync.yml` in the
/// working directory is used when present.
pub fn get_config(config_path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut builder = ConfigBuilder::builder()
        .set_default("db_url", DEFAULT_DB_FILE)?
        .set_default("files_dir", DEFAULT_FILES_DIR)?
        .set_default("connect_timeout_secs", DEFAULT_CONNECT_TIMEOUT_SECS)?
        .set_default("request_timeout_secs", DEFAULT_REQUEST_TIMEOUT_SECS)?;

    let content = match config_path {
        Some(path) => Some(
            read_and_substitute(path)?
                .ok_or_else(|| ConfigError::NotFound(path.display().to_string()))?,
        ),
        None => read_and_substitute(Path::new(DEFAULT_CONFIG_FILE))?,
    };
    if let Some(content) = content {
        info!(
            "Loading configuration from '{}'.",
            config_path.unwrap_or(Path::new(DEFAULT_CONFIG_FILE)).display()
        );
        builder = builder.add_source(File::from_str(&content, FileFormat::Yaml));
    }

    let settings = builder
        .add_source(
            Environment::with_prefix("FEEDSYNC")
                .prefix_separator("_")
                .try_parsing(true)
                .separator("__"),
        )
        .build()?;

    Ok(settings.try_deserialize()?)
}
