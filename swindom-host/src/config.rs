//! Host configuration, layered from TOML files
//!
//! Layers, later wins:
//! 1. built-in defaults
//! 2. user file `<config dir>/swindom/run-plugin.toml`
//! 3. `<settings dir>/run-plugin.toml`

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

/// File name looked up in each config layer
pub const CONFIG_FILE_NAME: &str = "run-plugin.toml";

/// Environment variable overriding the log filter
pub const LOG_ENV_VAR: &str = "SWINDOM_LOG";

const DEFAULT_LOG_FILTER: &str = "info";
const DEFAULT_WATCHDOG_POLL_INTERVAL_MS: u64 = 500;
const DEFAULT_CHANNEL_MAX_LINE_LENGTH: usize = 1024;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// One config file as written on disk; every key optional
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawHostConfig {
    log_filter: Option<String>,
    watchdog_poll_interval_ms: Option<u64>,
    channel_connect_timeout_ms: Option<u64>,
    channel_max_line_length: Option<usize>,
}

/// Effective host configuration
#[derive(Debug, Clone, PartialEq)]
pub struct HostConfig {
    /// `tracing_subscriber::EnvFilter` directive, unless [`LOG_ENV_VAR`] is set
    pub log_filter: Option<String>,
    /// How often the Unix watchdog checks the parent pid
    pub watchdog_poll_interval: Duration,
    /// How long to wait for the parent's channel to accept a connection.
    /// `None` waits until it does.
    pub channel_connect_timeout: Option<Duration>,
    /// Longest command line; longer lines are skipped
    pub channel_max_line_length: usize,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            log_filter: None,
            watchdog_poll_interval: Duration::from_millis(DEFAULT_WATCHDOG_POLL_INTERVAL_MS),
            channel_connect_timeout: None,
            channel_max_line_length: DEFAULT_CHANNEL_MAX_LINE_LENGTH,
        }
    }
}

impl HostConfig {
    /// Load the user layer and the settings-directory layer.
    ///
    /// A layer that fails to read or parse is skipped and its error returned
    /// alongside the config, so the caller can log it once logging is up.
    pub fn load(settings_dir: &Path) -> (Self, Vec<ConfigError>) {
        let mut paths = Vec::new();
        if let Some(user_path) = Self::user_config_path() {
            paths.push(user_path);
        }
        paths.push(settings_dir.join(CONFIG_FILE_NAME));

        Self::load_layers(&paths)
    }

    /// User config path (platform-specific)
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("swindom").join(CONFIG_FILE_NAME))
    }

    fn load_layers(paths: &[PathBuf]) -> (Self, Vec<ConfigError>) {
        let mut config = Self::default();
        let mut errors = Vec::new();

        for path in paths {
            match Self::read_layer(path) {
                Ok(Some(raw)) => config.apply(raw),
                Ok(None) => {}
                Err(e) => errors.push(e),
            }
        }

        (config, errors)
    }

    fn read_layer(path: &Path) -> Result<Option<RawHostConfig>, ConfigError> {
        if !path.exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let raw = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Some(raw))
    }

    fn apply(&mut self, raw: RawHostConfig) {
        if let Some(filter) = raw.log_filter {
            self.log_filter = Some(filter);
        }
        if let Some(ms) = raw.watchdog_poll_interval_ms {
            self.watchdog_poll_interval = Duration::from_millis(ms.max(1));
        }
        if let Some(ms) = raw.channel_connect_timeout_ms {
            self.channel_connect_timeout = Some(Duration::from_millis(ms));
        }
        if let Some(len) = raw.channel_max_line_length {
            self.channel_max_line_length = len.max(1);
        }
    }

    /// Log filter directive: env var, then config, then `info`
    pub fn effective_log_filter(&self) -> String {
        resolve_log_filter(std::env::var(LOG_ENV_VAR).ok(), self.log_filter.as_deref())
    }
}

/// Pick the log filter from the env value and the configured one. A blank
/// env value counts as unset.
fn resolve_log_filter(env: Option<String>, configured: Option<&str>) -> String {
    env.filter(|value| !value.trim().is_empty())
        .or_else(|| configured.map(str::to_string))
        .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string())
}
