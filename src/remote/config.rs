//! Connection settings for the marketplace API.

use std::fmt;
use std::time::Duration;

use serde::Deserialize;

/// Environment variable holding the API base URL.
pub const API_URL_ENV: &str = "HERD_SYNC_API_URL";
/// Environment variable holding an optional request timeout in seconds.
pub const TIMEOUT_ENV: &str = "HERD_SYNC_TIMEOUT_SECS";

/// Where the API lives and how to reach it.
///
/// Deserializable so it can sit inside an application's own config file.
/// No timeout is applied unless one is configured.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RemoteConfig {
    pub base_url: String,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    #[serde(default)]
    pub user_agent: Option<String>,
}

/// Error type for configuration loading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid { key: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "missing configuration value {}", key),
            ConfigError::Invalid { key, value } => {
                write!(f, "invalid value {:?} for {}", value, key)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl RemoteConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        RemoteConfig {
            base_url: base_url.into(),
            timeout_secs: None,
            user_agent: None,
        }
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Read `HERD_SYNC_API_URL` and `HERD_SYNC_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let base_url = lookup(API_URL_ENV)
            .filter(|url| !url.trim().is_empty())
            .ok_or(ConfigError::Missing(API_URL_ENV))?;

        let timeout_secs = match lookup(TIMEOUT_ENV) {
            Some(raw) => Some(raw.trim().parse::<u64>().map_err(|_| ConfigError::Invalid {
                key: TIMEOUT_ENV,
                value: raw.clone(),
            })?),
            None => None,
        };

        Ok(RemoteConfig {
            base_url,
            timeout_secs,
            user_agent: None,
        })
    }

    /// Base URL without trailing slashes.
    pub fn base(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}
