use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_POLL_INTERVAL_MILLISECONDS: u64 = 100;
pub const MINIMUM_POLL_INTERVAL_MILLISECONDS: u64 = 10;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read configuration: {source}")]
    Read {
        #[from]
        source: std::io::Error,
    },

    #[error("failed to parse TOML configuration: {source}")]
    Parse {
        #[from]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub watcher: WatcherConfig,
    pub windows: WindowsConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WatcherConfig {
    pub poll_interval_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WindowsConfig {
    pub normal_only: bool,
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MILLISECONDS,
        }
    }
}

impl WatcherConfig {
    pub fn with_poll_interval(poll_interval: Duration) -> Self {
        Self {
            poll_interval_ms: poll_interval.as_millis().try_into().unwrap_or(u64::MAX),
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(
            self.poll_interval_ms
                .max(MINIMUM_POLL_INTERVAL_MILLISECONDS),
        )
    }
}

impl Default for WindowsConfig {
    fn default() -> Self {
        Self { normal_only: true }
    }
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("xwin")
            .join("config.toml")
    }
}
