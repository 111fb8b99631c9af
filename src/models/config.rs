//! Application configuration structures.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{AppError, Result};
use crate::models::ProfileSelectors;

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// HTTP client settings
    #[serde(default)]
    pub client: ClientConfig,

    /// Forum endpoint settings
    #[serde(default)]
    pub forum: ForumConfig,

    /// Post watch behavior
    #[serde(default)]
    pub watch: WatchConfig,

    /// Profile page locators
    #[serde(default)]
    pub selectors: ProfileSelectors,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.client.user_agent.trim().is_empty() {
            return Err(AppError::validation("client.user_agent is empty"));
        }
        if self.client.timeout_secs == 0 {
            return Err(AppError::validation("client.timeout_secs must be > 0"));
        }
        if self.watch.poll_interval_secs == 0 {
            return Err(AppError::validation("watch.poll_interval_secs must be > 0"));
        }
        if Url::parse(&self.forum.base_url).is_err() {
            return Err(AppError::validation(format!(
                "forum.base_url is not a valid URL: {}",
                self.forum.base_url
            )));
        }
        self.selectors.validate()?;
        Ok(())
    }
}

/// HTTP client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
        }
    }
}

/// Forum endpoint settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForumConfig {
    /// Base URL of the forum, used to build member and search page URLs
    #[serde(default = "defaults::base_url")]
    pub base_url: String,
}

impl Default for ForumConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::base_url(),
        }
    }
}

/// Post watch behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchConfig {
    /// Seconds between polls of the member page
    #[serde(default = "defaults::poll_interval")]
    pub poll_interval_secs: u64,

    /// Stop the watch on the first fatal extraction error instead of
    /// logging and retrying on the next tick
    #[serde(default)]
    pub stop_on_error: bool,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: defaults::poll_interval(),
            stop_on_error: false,
        }
    }
}

mod defaults {
    // Client defaults
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; forumwatch/0.1)".into()
    }
    pub fn timeout() -> u64 {
        30
    }

    // Forum defaults
    pub fn base_url() -> String {
        "http://forum.sa-mp.com".into()
    }

    // Watch defaults
    pub fn poll_interval() -> u64 {
        10
    }
}
