//! Configuration management for pagexport
//!
//! Configuration precedence (highest to lowest):
//! 1. Command-line arguments
//! 2. Configuration file (TOML)
//! 3. Default values

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{ConfigError, Result};
use crate::export::options::{DEFAULT_LIMIT, DEFAULT_OFFSET, ExportOptions, OutputFormat};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// Data source configuration
    #[serde(default)]
    pub source: SourceConfig,

    /// Export defaults
    #[serde(default)]
    pub export: ExportConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Where documents come from
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SourceConfig {
    /// MongoDB connection URI
    #[serde(default = "default_uri")]
    pub uri: String,

    /// Database holding the collections below
    #[serde(default = "default_database")]
    pub database: String,

    /// Collection queried by search exports
    #[serde(default = "default_items_collection")]
    pub items_collection: String,

    /// Collection queried by order exports
    #[serde(default = "default_orders_collection")]
    pub orders_collection: String,

    /// Collection used to resolve nicknames
    #[serde(default = "default_users_collection")]
    pub users_collection: String,

    /// Connection and server selection timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

/// Export defaults
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExportConfig {
    #[serde(default)]
    pub format: OutputFormat,

    #[serde(default = "default_limit")]
    pub limit: u64,

    #[serde(default = "default_offset")]
    pub offset: u64,

    /// Add the nickname column to CSV exports
    #[serde(default)]
    pub include_extra_column: bool,

    /// Draw a progress bar on stderr
    #[serde(default = "default_progress")]
    pub progress: bool,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: LogLevel,

    /// Enable timestamps in logs
    #[serde(default)]
    pub timestamps: bool,
}

/// Log level options
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

// Default value functions
fn default_uri() -> String {
    "mongodb://localhost:27017".to_string()
}

fn default_database() -> String {
    "marketplace".to_string()
}

fn default_items_collection() -> String {
    "items".to_string()
}

fn default_orders_collection() -> String {
    "orders".to_string()
}

fn default_users_collection() -> String {
    "users".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_limit() -> u64 {
    DEFAULT_LIMIT
}

fn default_offset() -> u64 {
    DEFAULT_OFFSET
}

fn default_progress() -> bool {
    true
}

fn default_log_level() -> LogLevel {
    LogLevel::Warn
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            uri: default_uri(),
            database: default_database(),
            items_collection: default_items_collection(),
            orders_collection: default_orders_collection(),
            users_collection: default_users_collection(),
            timeout: default_timeout(),
        }
    }
}

impl SourceConfig {
    /// Connection and server selection timeout
    pub fn connection_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            limit: default_limit(),
            offset: default_offset(),
            include_extra_column: false,
            progress: default_progress(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            timestamps: false,
        }
    }
}

impl Config {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from `path`, or from the default location
    ///
    /// A missing file at the default location yields the defaults; an
    /// explicitly requested file must exist.
    pub fn load_from_file(path: Option<&Path>) -> Result<Self> {
        let (path, explicit) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (Self::default_path(), false),
        };

        if !path.exists() {
            if explicit {
                return Err(ConfigError::FileNotFound(path.display().to_string()).into());
            }
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path)
            .map_err(|e| ConfigError::FileNotFound(format!("{}: {}", path.display(), e)))?;
        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| ConfigError::InvalidFormat(e.to_string()).into())
    }

    /// Serialize configuration to TOML text
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::InvalidFormat(e.to_string()).into())
    }

    /// Get the default configuration file path
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".pagexport")
            .join("config.toml")
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.export_options().validate()?;
        if self.source.uri.trim().is_empty() {
            return Err(invalid("source.uri", &self.source.uri));
        }

        let names = [
            ("source.database", &self.source.database),
            ("source.items_collection", &self.source.items_collection),
            ("source.orders_collection", &self.source.orders_collection),
            ("source.users_collection", &self.source.users_collection),
        ];
        for (field, value) in names {
            if value.trim().is_empty() {
                return Err(invalid(field, value));
            }
        }

        Ok(())
    }

    /// Export options derived from the `[export]` section
    pub fn export_options(&self) -> ExportOptions {
        ExportOptions::new(self.export.format)
            .with_extra_column(self.export.include_extra_column)
            .with_offset(self.export.offset)
            .with_limit(self.export.limit)
    }
}

fn invalid(field: &str, value: &str) -> crate::error::PagexportError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
    }
    .into()
}

impl LogLevel {
    /// Convert to tracing::Level
    pub fn to_tracing_level(&self) -> tracing::Level {
        match self {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}
