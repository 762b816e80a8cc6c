//! Configuration loading for vector-storage.
//!
//! Layered config: defaults -> config file -> env vars -> CLI flags.
//! The default config file lives at ~/.config/vector-storage/config.toml.

use config::{Config, Environment, File};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::TypesError;

/// Default eviction budget (MB)
pub const DEFAULT_MAX_SIZE_IN_MB: f64 = 2048.0;

/// Default embedding model
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-ada-002";

/// Default embedding API base URL
pub const DEFAULT_API_BASE_URL: &str = "https://api.openai.com/v1";

/// Embedding provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingSettings {
    /// Model name passed to the provider
    #[serde(default = "default_embedding_model")]
    pub model: String,

    /// API key (usually from env, not stored in the config file)
    #[serde(default)]
    pub api_key: Option<String>,

    /// API base URL (for compatible endpoints)
    #[serde(default)]
    pub api_base_url: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Attempts per embedding request before giving up
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

fn default_embedding_model() -> String {
    DEFAULT_EMBEDDING_MODEL.to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_max_retries() -> u32 {
    3
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            model: default_embedding_model(),
            api_key: None,
            api_base_url: None,
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
        }
    }
}

impl EmbeddingSettings {
    /// Base URL without a trailing `/`, falling back to the public OpenAI endpoint.
    pub fn base_url(&self) -> &str {
        self.api_base_url
            .as_deref()
            .unwrap_or(DEFAULT_API_BASE_URL)
            .trim_end_matches('/')
    }
}

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Path to the RocksDB snapshot directory
    #[serde(default = "default_db_path")]
    pub db_path: String,

    /// Eviction budget for the resident collection (MB)
    #[serde(default = "default_max_size_in_mb")]
    pub max_size_in_mb: f64,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Embedding provider configuration
    #[serde(default)]
    pub embedding: EmbeddingSettings,
}

fn default_db_path() -> String {
    ProjectDirs::from("", "", "vector-storage")
        .map(|p| p.data_local_dir().join("db"))
        .unwrap_or_else(|| PathBuf::from("./data"))
        .to_string_lossy()
        .to_string()
}

fn default_max_size_in_mb() -> f64 {
    DEFAULT_MAX_SIZE_IN_MB
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            max_size_in_mb: default_max_size_in_mb(),
            log_level: default_log_level(),
            embedding: EmbeddingSettings::default(),
        }
    }
}

impl Settings {
    /// Load settings with layered precedence:
    /// 1. Built-in defaults
    /// 2. Config file (~/.config/vector-storage/config.toml)
    /// 3. CLI-specified config file (optional)
    /// 4. Environment variables (VSTORE_*, `__` between nested keys)
    ///
    /// CLI flags should be applied by the caller after this returns.
    pub fn load(cli_config_path: Option<&str>) -> Result<Self, TypesError> {
        let config_dir = ProjectDirs::from("", "", "vector-storage")
            .map(|p| p.config_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."));

        let default_config_path = config_dir.join("config");

        let mut builder = Config::builder()
            .set_default("db_path", default_db_path())
            .map_err(|e| TypesError::Config(e.to_string()))?
            .set_default("max_size_in_mb", default_max_size_in_mb())
            .map_err(|e| TypesError::Config(e.to_string()))?
            .set_default("log_level", default_log_level())
            .map_err(|e| TypesError::Config(e.to_string()))?
            .set_default("embedding.model", default_embedding_model())
            .map_err(|e| TypesError::Config(e.to_string()))?
            .set_default("embedding.timeout_secs", default_timeout_secs() as i64)
            .map_err(|e| TypesError::Config(e.to_string()))?
            .set_default("embedding.max_retries", default_max_retries() as i64)
            .map_err(|e| TypesError::Config(e.to_string()))?
            .add_source(File::with_name(&default_config_path.to_string_lossy()).required(false));

        if let Some(path) = cli_config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // VSTORE_MAX_SIZE_IN_MB, VSTORE_EMBEDDING__API_KEY, ...
        builder = builder.add_source(
            Environment::with_prefix("VSTORE")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder
            .build()
            .map_err(|e| TypesError::Config(e.to_string()))?;

        let settings: Settings = config
            .try_deserialize()
            .map_err(|e| TypesError::Config(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), TypesError> {
        if !self.max_size_in_mb.is_finite() || self.max_size_in_mb <= 0.0 {
            return Err(TypesError::Config(format!(
                "max_size_in_mb must be a positive number, got {}",
                self.max_size_in_mb
            )));
        }
        if self.embedding.max_retries == 0 {
            return Err(TypesError::Config(
                "embedding.max_retries must be > 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Expand ~ in db_path to the home directory
    pub fn expanded_db_path(&self) -> PathBuf {
        if let Some(rest) = self.db_path.strip_prefix("~/") {
            if let Some(home) = directories::BaseDirs::new().map(|d| d.home_dir().to_path_buf()) {
                return home.join(rest);
            }
        }
        PathBuf::from(&self.db_path)
    }
}
