use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,
}

/// General configuration settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Maximum number of clipboard entries to keep
    #[serde(default = "default_max_items")]
    pub max_items: usize,

    /// How often the clipboard is checked for changes
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Maximum image size in bytes (larger images are not captured)
    #[serde(default = "default_max_image_size")]
    pub max_image_size_bytes: u64,

    /// Enable debug logging
    #[serde(default)]
    pub debug_logging: bool,

    /// Write logs to this file instead of stderr
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,
}

impl GeneralConfig {
    pub fn poll_interval(&self) -> Duration {
        // A zero interval would spin the poller
        Duration::from_millis(self.poll_interval_ms.max(MIN_POLL_INTERVAL_MS))
    }
}

impl Default for GeneralConfig {
    fn default() -> Self {
        GeneralConfig {
            max_items: default_max_items(),
            poll_interval_ms: default_poll_interval_ms(),
            max_image_size_bytes: default_max_image_size(),
            debug_logging: false,
            log_file: None,
        }
    }
}

const MIN_POLL_INTERVAL_MS: u64 = 10;

// Default value functions for serde
fn default_max_items() -> usize {
    crate::models::DEFAULT_MAX_ENTRIES
}

fn default_poll_interval_ms() -> u64 {
    crate::clipboard::watch::DEFAULT_POLL_INTERVAL.as_millis() as u64
}

fn default_max_image_size() -> u64 {
    crate::image::DEFAULT_MAX_IMAGE_SIZE_BYTES
}

/// Trait for configuration storage
pub trait ConfigStorage: Send + Sync {
    /// Load configuration from file
    fn load(&self) -> Result<Config>;

    /// Save configuration to file
    fn save(&self, config: &Config) -> Result<()>;

    /// Get the config file path
    fn path(&self) -> &PathBuf;

    /// Create default configuration file if it doesn't exist
    fn create_default(&self) -> Result<()>;
}

/// TOML-based implementation of ConfigStorage
pub struct TomlConfigStorage {
    path: PathBuf,
}

impl TomlConfigStorage {
    /// Create a new TomlConfigStorage with the given path
    pub fn new(path: PathBuf) -> Self {
        TomlConfigStorage { path }
    }
}

impl ConfigStorage for TomlConfigStorage {
    fn load(&self) -> Result<Config> {
        // If file doesn't exist, create default and return it
        if !self.path.exists() {
            log::info!(
                "Config file not found at {:?}, creating default configuration",
                self.path
            );
            self.create_default()?;
            return Ok(Config::default());
        }

        let contents = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read config from {:?}", self.path))?;

        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {:?}", self.path))?;

        log::info!("Loaded configuration from {:?}", self.path);
        log::debug!(
            "Config: max_items={}, poll_interval_ms={}",
            config.general.max_items,
            config.general.poll_interval_ms
        );

        Ok(config)
    }

    fn save(&self, config: &Config) -> Result<()> {
        let toml_str = toml::to_string_pretty(config)
            .with_context(|| "Failed to serialize configuration")?;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {:?}", parent))?;
        }

        fs::write(&self.path, toml_str)
            .with_context(|| format!("Failed to write config to {:?}", self.path))?;

        log::debug!("Saved configuration to {:?}", self.path);

        Ok(())
    }

    fn path(&self) -> &PathBuf {
        &self.path
    }

    fn create_default(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {:?}", parent))?;
        }

        // Use the example config compiled into the binary
        let example_config = include_str!("../clipstack.toml.example");

        fs::write(&self.path, example_config)
            .with_context(|| format!("Failed to create default config at {:?}", self.path))?;

        log::info!("Created default configuration at {:?}", self.path);

        Ok(())
    }
}

/// Ensure the XDG config directory exists and return it
///
/// $XDG_CONFIG_HOME/clipstack (default: ~/.config/clipstack)
pub fn ensure_config_dir() -> Result<PathBuf> {
    let config_dir = if let Ok(xdg_config) = env::var("XDG_CONFIG_HOME") {
        PathBuf::from(xdg_config).join("clipstack")
    } else {
        let home = env::var("HOME").context("HOME environment variable not set")?;
        PathBuf::from(home).join(".config/clipstack")
    };

    fs::create_dir_all(&config_dir)
        .with_context(|| format!("Failed to create config directory {:?}", config_dir))?;

    log::debug!("Config directory: {:?}", config_dir);
    Ok(config_dir)
}
