//! Configuration loading and validation.
//!
//! The bridge reads `config.toml` with a required `[ntfy]` table and an
//! optional `[poll]` table. All `[ntfy]` keys must be present and non-empty
//! before either the inbound or the outbound path is allowed to start.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// Configuration error.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required `[ntfy]` key is missing or empty.
    #[error("ntfy config is missing required key: {0}")]
    MissingKey(&'static str),
    /// The configured host is not a parseable URL.
    #[error("ntfy host is not a valid URL: {0}")]
    InvalidHost(String),
    /// The config file could not be read.
    #[error("failed to read config at {path}: {source}")]
    Io {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The config file could not be parsed as TOML.
    #[error("failed to parse config at {path}: {source}")]
    Parse {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying TOML error.
        #[source]
        source: toml::de::Error,
    },
}

/// Top-level bridge configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// ntfy connection settings.
    pub ntfy: NtfyConfig,

    /// Polling behaviour.
    #[serde(default)]
    pub poll: PollConfig,
}

/// ntfy connection settings.
///
/// All keys are required and must be non-empty; [`NtfyConfig::validate`]
/// enforces this before the bridge starts.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NtfyConfig {
    /// Base URL of the ntfy server (e.g. "https://ntfy.sh").
    pub host: String,

    /// Bearer token for both subscribe and publish.
    pub token: String,

    /// Topic polled for inbound notifications.
    pub subscribe_topic: String,

    /// Outbound topic list, comma-separated. Only the first segment is
    /// published to; fan-out is not implemented.
    pub publish_topic: String,

    /// Comma-separated sender identifiers allowed to publish.
    pub sender: String,

    /// Reserved for future routing. Validated but unused by current logic.
    pub receiver: String,
}

/// Polling behaviour.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PollConfig {
    /// Seconds between poll cycles.
    pub interval_secs: u64,

    /// Milliseconds to wait before each dispatch into the chat sink.
    /// Values below 500 are clamped up to 500.
    pub dispatch_delay_ms: u64,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            dispatch_delay_ms: default_dispatch_delay_ms(),
        }
    }
}

fn default_interval_secs() -> u64 {
    10
}
fn default_dispatch_delay_ms() -> u64 {
    500
}

impl NtfyConfig {
    /// Check that every required key is present and non-empty and that the
    /// host parses as a URL.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingKey`] naming the first missing key, or
    /// [`ConfigError::InvalidHost`] if the host is not a URL.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let required: [(&'static str, &str); 6] = [
            ("host", &self.host),
            ("token", &self.token),
            ("subscribe_topic", &self.subscribe_topic),
            ("publish_topic", &self.publish_topic),
            ("sender", &self.sender),
            ("receiver", &self.receiver),
        ];
        for (key, value) in required {
            if value.trim().is_empty() {
                return Err(ConfigError::MissingKey(key));
            }
        }
        url::Url::parse(&self.host).map_err(|_| ConfigError::InvalidHost(self.host.clone()))?;
        Ok(())
    }

    /// Sender identifiers allowed to publish, from the comma-separated
    /// `sender` value. Segments are trimmed; empty segments are dropped.
    pub fn authorized_senders(&self) -> HashSet<String> {
        self.sender
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_owned)
            .collect()
    }

    /// Resolve the outbound topic: the first comma-separated segment of
    /// `publish_topic`, trimmed. Returns `None` when the result is empty.
    pub fn resolved_publish_topic(&self) -> Option<String> {
        let topic = self
            .publish_topic
            .split(',')
            .next()
            .unwrap_or_default()
            .trim();
        if topic.is_empty() {
            None
        } else {
            Some(topic.to_owned())
        }
    }
}

impl PollConfig {
    /// Dispatch delay with the 500 ms floor applied.
    pub fn dispatch_delay(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.dispatch_delay_ms.max(500))
    }

    /// Poll interval as a duration.
    pub fn interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.interval_secs)
    }
}

/// Load the bridge config from a TOML file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    let config: Config = toml::from_str(&contents).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(config)
}

/// Resolve the default config directory (`~/.ntfy-bridge/`).
///
/// # Errors
///
/// Returns an error if the home directory cannot be determined.
pub fn config_dir() -> anyhow::Result<PathBuf> {
    let home = directories::BaseDirs::new()
        .ok_or_else(|| anyhow::anyhow!("cannot determine home directory"))?;
    Ok(home.home_dir().join(".ntfy-bridge"))
}
