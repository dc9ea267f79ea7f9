//! YAML configuration for the mutator.
//!
//! ```yaml
//! store:
//!   url: redis://:${REDIS_PASSWORD}@redis.internal:6379/0
//!   query_timeout_ms: 500
//! maintenance:
//!   subscriptions_key: maintenance:subscriptions
//!   names_key: maintenance:names
//! environments:
//!   extra_patterns:
//!     - "^sandbox"
//! ```
//!
//! Every section and field is optional. `${VAR}` references are replaced with
//! environment variables before parsing.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;
use std::sync::OnceLock;
use std::time::Duration;
use thiserror::Error;

use crate::environment::EnvironmentClassifier;
use crate::maintenance::MaintenanceKeys;
use crate::store::RedisStoreConfig;

/// Errors that can occur during configuration loading.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse YAML configuration: {0}")]
    ParseError(#[from] serde_yaml::Error),

    #[error("Invalid regex pattern '{pattern}': {message}")]
    InvalidRegex { pattern: String, message: String },

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),

    #[error("Environment variable not found: {0}")]
    EnvVarNotFound(String),
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MutatorConfig {
    /// Maintenance store connection.
    pub store: StoreConfig,
    /// Maintenance set names.
    pub maintenance: MaintenanceConfig,
    /// Environment classification.
    pub environments: EnvironmentConfig,
}

/// Maintenance store connection settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Redis connection URL.
    pub url: String,
    /// Maximum pooled connections.
    pub max_connections: u32,
    /// Connection checkout timeout in milliseconds.
    pub connect_timeout_ms: u64,
    /// Per-query timeout in milliseconds.
    pub query_timeout_ms: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        let redis = RedisStoreConfig::default();
        Self {
            url: redis.url,
            max_connections: redis.max_connections,
            connect_timeout_ms: redis.connect_timeout.as_millis() as u64,
            query_timeout_ms: redis.query_timeout.as_millis() as u64,
        }
    }
}

/// Maintenance set names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaintenanceConfig {
    pub subscriptions_key: String,
    pub names_key: String,
}

impl Default for MaintenanceConfig {
    fn default() -> Self {
        let keys = MaintenanceKeys::default();
        Self {
            subscriptions_key: keys.subscriptions,
            names_key: keys.names,
        }
    }
}

/// Environment classification settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvironmentConfig {
    /// Regexes appended to the built-in non-production patterns.
    pub extra_patterns: Vec<String>,
}

impl MutatorConfig {
    /// Loads the configuration at `path`, or the defaults if it does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            load_config(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Redis store settings.
    pub fn redis_store_config(&self) -> RedisStoreConfig {
        RedisStoreConfig::new(self.store.url.clone())
            .with_max_connections(self.store.max_connections)
            .with_connect_timeout(Duration::from_millis(self.store.connect_timeout_ms))
            .with_query_timeout(Duration::from_millis(self.store.query_timeout_ms))
    }

    /// Maintenance set names.
    pub fn maintenance_keys(&self) -> MaintenanceKeys {
        MaintenanceKeys {
            subscriptions: self.maintenance.subscriptions_key.clone(),
            names: self.maintenance.names_key.clone(),
        }
    }

    /// Builds the environment classifier, including any extra patterns.
    pub fn classifier(&self) -> Result<EnvironmentClassifier, ConfigError> {
        EnvironmentClassifier::with_extra_patterns(&self.environments.extra_patterns)
    }

    /// Checks values that deserialize fine but cannot work.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.store.url.trim().is_empty() {
            return Err(ConfigError::InvalidValue("store.url is empty".to_string()));
        }
        if self.store.max_connections == 0 {
            return Err(ConfigError::InvalidValue(
                "store.max_connections must be at least 1".to_string(),
            ));
        }
        if self.store.connect_timeout_ms == 0 || self.store.query_timeout_ms == 0 {
            return Err(ConfigError::InvalidValue(
                "store timeouts must be greater than zero".to_string(),
            ));
        }
        if self.maintenance.subscriptions_key.is_empty() || self.maintenance.names_key.is_empty()
        {
            return Err(ConfigError::InvalidValue(
                "maintenance set names must not be empty".to_string(),
            ));
        }
        if self.maintenance.subscriptions_key == self.maintenance.names_key {
            return Err(ConfigError::InvalidValue(format!(
                "maintenance.subscriptions_key and maintenance.names_key are both '{}'",
                self.maintenance.names_key
            )));
        }
        self.classifier()?;
        Ok(())
    }
}

fn env_var_regex() -> &'static Regex {
    static INSTANCE: OnceLock<Regex> = OnceLock::new();
    INSTANCE.get_or_init(|| {
        Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("Invalid regex for env vars")
    })
}

/// Substitutes environment variables in a string.
///
/// Replaces patterns like `${VAR_NAME}` with the corresponding environment variable value.
fn substitute_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut missing = Vec::new();

    let result = env_var_regex().replace_all(input, |caps: &regex::Captures<'_>| {
        let var_name = &caps[1];
        match env::var(var_name) {
            Ok(value) => value,
            Err(_) => {
                missing.push(var_name.to_string());
                String::new()
            }
        }
    });

    if !missing.is_empty() {
        return Err(ConfigError::EnvVarNotFound(missing.join(", ")));
    }

    Ok(result.into_owned())
}

/// Parses and validates configuration from a YAML string.
pub fn parse_config(content: &str) -> Result<MutatorConfig, ConfigError> {
    let content = substitute_env_vars(content)?;
    // An empty file is a valid, all-defaults configuration.
    let config: MutatorConfig = if content.trim().is_empty() {
        MutatorConfig::default()
    } else {
        serde_yaml::from_str(&content)?
    };
    config.validate()?;
    Ok(config)
}

/// Loads and validates the configuration file at `path`.
pub fn load_config(path: &Path) -> Result<MutatorConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}
