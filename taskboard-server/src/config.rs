//! Server configuration using Figment
//!
//! Sources are merged in precedence order (later sources override earlier ones):
//! 1. Built-in defaults
//! 2. `taskboard.toml` / `taskboard.yaml` / `taskboard.json` in the working directory
//! 3. An explicit `--config` file
//! 4. `PORT`, then `TASKBOARD_`-prefixed environment variables
//! 5. Command line flags

use figment::{
    providers::{Env, Format, Json, Serialized, Toml, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use taskboard_kanban::notify::DEFAULT_CAPACITY;
use thiserror::Error;
use tracing::{debug, trace};

/// Environment variable prefix for configuration keys
pub const ENV_PREFIX: &str = "TASKBOARD_";

/// Configuration file names discovered in the working directory
const CONFIG_FILE_NAMES: [&str; 4] = [
    "taskboard.toml",
    "taskboard.yaml",
    "taskboard.yml",
    "taskboard.json",
];

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Explicitly requested configuration file does not exist
    #[error("Configuration file not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Configuration parsing failed
    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] Box<figment::Error>),

    /// A value parsed but makes no sense
    #[error("Invalid configuration value for key '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

impl From<figment::Error> for ConfigError {
    fn from(error: figment::Error) -> Self {
        ConfigError::Parse(Box::new(error))
    }
}

/// Where task records live
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    /// One JSON file per record under `data_dir`
    #[default]
    File,
    /// Process memory; everything is lost on exit
    Memory,
}

/// Resolved server configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub data_dir: PathBuf,
    pub storage: StorageKind,
    /// Signals buffered per WebSocket observer before it lags
    pub broadcast_capacity: usize,
    /// Default tracing level when no flag or `RUST_LOG` says otherwise
    pub log_level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            data_dir: PathBuf::from(".taskboard"),
            storage: StorageKind::File,
            broadcast_capacity: DEFAULT_CAPACITY,
            log_level: "info".to_string(),
        }
    }
}

/// Values supplied on the command line; unset fields leave lower layers alone
#[derive(Debug, Clone, Default, Serialize)]
pub struct ConfigOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage: Option<StorageKind>,
}

impl ServerConfig {
    /// Load configuration from every source, with `overrides` on top
    pub fn load(
        config_file: Option<&Path>,
        overrides: &ConfigOverrides,
    ) -> Result<Self, ConfigError> {
        let config: ServerConfig = Self::figment(config_file)?
            .merge(Serialized::defaults(overrides))
            .extract()?;
        config.validate()?;
        debug!(?config, "loaded server configuration");
        Ok(config)
    }

    /// Build the layered figment without command line overrides
    pub fn figment(config_file: Option<&Path>) -> Result<Figment, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(ServerConfig::default()));

        for name in CONFIG_FILE_NAMES {
            let path = Path::new(name);
            if path.exists() {
                trace!(path = %path.display(), "merging discovered config file");
                figment = figment.merge(file_provider(path));
            }
        }

        if let Some(path) = config_file {
            if !path.exists() {
                return Err(ConfigError::FileNotFound {
                    path: path.to_path_buf(),
                });
            }
            trace!(path = %path.display(), "merging explicit config file");
            figment = figment.merge(file_provider(path));
        }

        Ok(figment
            .merge(Env::raw().only(&["PORT"]))
            .merge(Env::prefixed(ENV_PREFIX)))
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.broadcast_capacity == 0 {
            return Err(ConfigError::InvalidValue {
                key: "broadcast_capacity".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if self.host.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "host".to_string(),
                message: "must not be empty".to_string(),
            });
        }
        Ok(())
    }

    /// `host:port` to bind the listener to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn file_provider(path: &Path) -> Figment {
    match path.extension().and_then(|e| e.to_str()) {
        Some("yaml") | Some("yml") => Figment::from(Yaml::file(path)),
        Some("json") => Figment::from(Json::file(path)),
        _ => Figment::from(Toml::file(path)),
    }
}
