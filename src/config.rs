//! Configuration module for loading and parsing TOML configuration files.

use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Configuration error types.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),
    /// Failed to parse TOML configuration.
    #[error("failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),
    /// Invalid configuration value.
    #[error("invalid config value: {0}")]
    InvalidValue(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// ISIN registry configuration.
    #[serde(default)]
    pub registry: RegistryConfig,
    /// Database configuration.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Users allowed to call the API.
    #[serde(default)]
    pub users: Vec<UserConfig>,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host address to bind to.
    pub host: String,
    /// Port number to listen on.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

/// ISIN registry configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// URL prefix; the ISIN is appended verbatim.
    pub base_url: String,
    /// Per-request timeout in milliseconds.
    pub timeout_ms: u64,
    /// Consecutive transport failures before the circuit opens.
    pub failure_threshold: u32,
    /// Seconds the circuit stays open.
    pub cooldown_secs: u64,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8081/isin/".to_string(),
            timeout_ms: 5000,
            failure_threshold: 5,
            cooldown_secs: 30,
        }
    }
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// PostgreSQL connection string. Without it bonds live in memory.
    pub url: Option<String>,
    /// Upper bound on pooled connections.
    pub max_connections: u32,
    /// Seconds to wait for a free connection.
    pub acquire_timeout_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: 10,
            acquire_timeout_secs: 5,
        }
    }
}

/// A user identity and its API key.
#[derive(Debug, Clone, Deserialize)]
pub struct UserConfig {
    /// User id.
    pub id: i64,
    /// Raw API key. A key is generated at startup when omitted.
    pub api_key: Option<String>,
    /// Staff users can access every user's bonds.
    #[serde(default)]
    pub is_staff: bool,
    /// Superusers can access every user's bonds.
    #[serde(default)]
    pub is_superuser: bool,
}

impl Config {
    /// Loads configuration from a TOML file.
    ///
    /// # Arguments
    /// * `path` - Path to the configuration file.
    ///
    /// # Errors
    /// Returns error if file cannot be read or parsed.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Errors
    /// Returns error if content cannot be parsed.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.registry.base_url.trim().is_empty() {
            return Err(ConfigError::InvalidValue(
                "registry base_url cannot be empty".to_string(),
            ));
        }
        if self.registry.timeout_ms == 0 {
            return Err(ConfigError::InvalidValue(
                "registry timeout_ms must be positive".to_string(),
            ));
        }
        if self.registry.failure_threshold == 0 {
            return Err(ConfigError::InvalidValue(
                "registry failure_threshold must be positive".to_string(),
            ));
        }
        if self.database.max_connections == 0 {
            return Err(ConfigError::InvalidValue(
                "database max_connections must be positive".to_string(),
            ));
        }

        let mut ids = HashSet::new();
        let mut keys = HashSet::new();
        for user in &self.users {
            if !ids.insert(user.id) {
                return Err(ConfigError::InvalidValue(format!(
                    "user {} is configured twice",
                    user.id
                )));
            }
            if let Some(key) = &user.api_key {
                if key.is_empty() {
                    return Err(ConfigError::InvalidValue(format!(
                        "user {} api_key cannot be empty",
                        user.id
                    )));
                }
                if !keys.insert(key.as_str()) {
                    return Err(ConfigError::InvalidValue(format!(
                        "user {} reuses another user's api_key",
                        user.id
                    )));
                }
            }
        }

        Ok(())
    }
}
