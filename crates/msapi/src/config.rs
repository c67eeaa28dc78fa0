//! Configuration loading from file and environment variables.

use std::time::Duration;

use msapi_auth::{DEFAULT_SECRET, SECRET_ENV_VAR};
use msapi_db::{ConnectionDescriptor, PoolLimits, SqliteSettings};
use serde::Deserialize;
use thiserror::Error;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Database settings.
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Token signing settings.
    #[serde(default)]
    pub auth: AuthConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Connection descriptor handed to the driver. Empty means unconfigured.
    #[serde(default)]
    pub descriptor: String,

    /// Maximum lifetime of a pooled connection, in seconds.
    #[serde(default = "default_max_lifetime_secs")]
    pub max_lifetime_secs: u64,

    /// Maximum number of idle pooled connections.
    #[serde(default = "default_max_idle_connections")]
    pub max_idle_connections: u32,

    /// How long to wait for a connection, in milliseconds.
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,

    /// Busy timeout for SQLite connections, in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
}

/// Token signing configuration.
#[derive(Clone, Deserialize)]
pub struct AuthConfig {
    /// Shared HMAC secret.
    #[serde(default = "default_secret")]
    pub secret: String,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "msapi_db=debug,info").
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Whether to output logs in JSON format.
    #[serde(default)]
    pub json: bool,
}

fn default_max_lifetime_secs() -> u64 {
    10
}

fn default_max_idle_connections() -> u32 {
    5
}

fn default_connect_timeout_ms() -> u64 {
    5_000
}

fn default_busy_timeout_ms() -> u64 {
    5_000
}

fn default_secret() -> String {
    DEFAULT_SECRET.to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            descriptor: String::new(),
            max_lifetime_secs: default_max_lifetime_secs(),
            max_idle_connections: default_max_idle_connections(),
            connect_timeout_ms: default_connect_timeout_ms(),
            busy_timeout_ms: default_busy_timeout_ms(),
        }
    }
}

impl DatabaseConfig {
    pub fn descriptor(&self) -> ConnectionDescriptor {
        ConnectionDescriptor::new(self.descriptor.clone())
    }

    pub fn pool_limits(&self) -> PoolLimits {
        PoolLimits {
            max_lifetime: Duration::from_secs(self.max_lifetime_secs),
            max_idle_connections: self.max_idle_connections,
            connect_timeout: Duration::from_millis(self.connect_timeout_ms),
        }
    }

    pub fn sqlite_settings(&self) -> SqliteSettings {
        SqliteSettings {
            busy_timeout_ms: self.busy_timeout_ms,
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            secret: default_secret(),
        }
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse the configuration file.
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Loads configuration from a TOML file, falling back to defaults.
///
/// Environment variables are read once, here, and override the file:
/// - `dbaccessPath` overrides `database.descriptor`
/// - `jwt-secretKey` overrides `auth.secret`
/// - `MSAPI_LOG_LEVEL` overrides `logging.level`
/// - `MSAPI_LOG_JSON` overrides `logging.json` (set to "true" to enable)
///
/// # Errors
///
/// Returns `ConfigError` if the file exists but cannot be read or parsed.
pub fn load_config(path: Option<&str>) -> Result<Config, ConfigError> {
    let mut config = match path {
        Some(p) => match std::fs::read_to_string(p) {
            Ok(contents) => toml::from_str(&contents)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = p, "config file not found, using defaults");
                Config::default()
            }
            Err(e) => return Err(ConfigError::FileRead(e)),
        },
        None => Config::default(),
    };

    // Environment variable overrides
    if let Ok(descriptor) = std::env::var(ConnectionDescriptor::ENV_VAR) {
        if !descriptor.trim().is_empty() {
            config.database.descriptor = descriptor;
        }
    }
    if let Ok(secret) = std::env::var(SECRET_ENV_VAR) {
        if !secret.is_empty() {
            config.auth.secret = secret;
        }
    }
    if let Ok(level) = std::env::var("MSAPI_LOG_LEVEL") {
        config.logging.level = level;
    }
    if let Ok(json) = std::env::var("MSAPI_LOG_JSON") {
        config.logging.json = json == "true" || json == "1";
    }

    Ok(config)
}
