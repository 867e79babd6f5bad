//! Bootstrap configuration for the ingest service
//!
//! # Settings Sources Priority
//!
//! 1. Command-line arguments (`--database`, `--batch-size`, `--log-level`)
//! 2. Environment variables (`SONGCAT_DATABASE`, `SONGCAT_BATCH_SIZE`, `SONGCAT_LOG_LEVEL`)
//! 3. TOML configuration file
//! 4. Built-in defaults (code constants)
//!
//! A missing TOML file is not fatal: a warning is logged and the defaults apply.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{info, warn};

pub const ENV_DATABASE_PATH: &str = "SONGCAT_DATABASE";
pub const ENV_BATCH_SIZE: &str = "SONGCAT_BATCH_SIZE";
pub const ENV_LOG_LEVEL: &str = "SONGCAT_LOG_LEVEL";

pub const DEFAULT_BATCH_SIZE: usize = 1000;
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Bootstrap configuration as read from the TOML file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    /// Path to the SQLite catalog database
    #[serde(default)]
    pub database_path: Option<PathBuf>,

    #[serde(default)]
    pub ingest: IngestSection,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// `[ingest]` table
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IngestSection {
    /// Records per reconciliation batch
    #[serde(default)]
    pub batch_size: Option<usize>,

    /// SQLite pool size
    #[serde(default)]
    pub max_connections: Option<u32>,
}

/// `[logging]` table
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Command-line configuration overrides
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub database_path: Option<PathBuf>,
    pub batch_size: Option<usize>,
    pub log_level: Option<String>,
}

/// Fully resolved ingest configuration
#[derive(Debug, Clone, PartialEq)]
pub struct IngestConfig {
    pub database_path: PathBuf,
    pub batch_size: usize,
    pub max_connections: u32,
    pub log_level: String,
}

impl IngestConfig {
    /// Resolve the configuration from CLI overrides, environment, TOML file and defaults
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if:
    /// - the TOML file exists but cannot be read or parsed
    /// - an environment override cannot be parsed
    /// - the resolved batch size or pool size is zero
    pub fn resolve(toml_path: &Path, overrides: ConfigOverrides) -> Result<Self> {
        let toml_config = load_toml_config(toml_path)?;

        let database_path = match overrides.database_path {
            Some(path) => path,
            None => match env_override::<PathBuf>(ENV_DATABASE_PATH)? {
                Some(path) => path,
                None => toml_config
                    .database_path
                    .unwrap_or_else(default_database_path),
            },
        };

        let batch_size = match overrides.batch_size {
            Some(size) => size,
            None => env_override::<usize>(ENV_BATCH_SIZE)?
                .or(toml_config.ingest.batch_size)
                .unwrap_or(DEFAULT_BATCH_SIZE),
        };

        let log_level = match overrides.log_level {
            Some(level) => level,
            None => env_override::<String>(ENV_LOG_LEVEL)?.unwrap_or(toml_config.logging.level),
        };

        let max_connections = toml_config
            .ingest
            .max_connections
            .unwrap_or(DEFAULT_MAX_CONNECTIONS);

        if batch_size == 0 {
            return Err(Error::Config("batch_size must be greater than zero".to_string()));
        }
        if max_connections == 0 {
            return Err(Error::Config(
                "max_connections must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            database_path,
            batch_size,
            max_connections,
            log_level,
        })
    }
}

/// Load the TOML bootstrap file, falling back to defaults when it does not exist
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    if !path.exists() {
        warn!(
            "Config file {} not found, using built-in defaults",
            path.display()
        );
        return Ok(TomlConfig::default());
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Failed to read {}: {}", path.display(), e)))?;
    let config: TomlConfig = toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Failed to parse {}: {}", path.display(), e)))?;

    info!("Loaded TOML configuration from {}", path.display());
    Ok(config)
}

/// Default TOML location: `<config_dir>/songcat/songcat-ingest.toml`
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .map(|d| d.join("songcat").join("songcat-ingest.toml"))
        .unwrap_or_else(|| PathBuf::from("songcat-ingest.toml"))
}

/// Default database location: `<data_local_dir>/songcat/catalog.db`
pub fn default_database_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("songcat").join("catalog.db"))
        .unwrap_or_else(|| PathBuf::from("./songcat_data/catalog.db"))
}

fn env_override<T: FromStr>(name: &str) -> Result<Option<T>> {
    match std::env::var(name) {
        Ok(raw) if raw.trim().is_empty() => Ok(None),
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| Error::Config(format!("Invalid value for {}: '{}'", name, raw))),
        Err(_) => Ok(None),
    }
}
