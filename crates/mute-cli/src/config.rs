//! Configuration resolution for the mutator CLI.

use std::path::{Path, PathBuf};

use mute_core::config::ConfigError;
use mute_core::MutatorConfig;

/// Where configuration comes from, as given on the command line.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Path of the YAML configuration file. A missing file means defaults.
    pub config_path: PathBuf,
    /// Overrides `store.url` when set.
    pub redis_url: Option<String>,
}

impl Settings {
    pub fn new(config_path: PathBuf, redis_url: Option<String>) -> Self {
        Self {
            config_path,
            redis_url,
        }
    }

    /// Loads the configuration file (or defaults) and applies CLI overrides.
    pub fn load(&self) -> Result<MutatorConfig, ConfigError> {
        let mut config = MutatorConfig::load_or_default(&self.config_path)?;
        if let Some(url) = &self.redis_url {
            config.store.url = url.clone();
            config.validate()?;
        }
        Ok(config)
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }
}

/// Default configuration location for the current platform.
pub fn default_config_path() -> PathBuf {
    if let Some(dirs) =
        directories::ProjectDirs::from("com", "maintenance-mutator", "maintenance-mutator")
    {
        dirs.config_dir().join("config.yaml")
    } else {
        PathBuf::from("/etc/maintenance-mutator/config.yaml")
    }
}
