//! Client configuration
//!
//! Every section has serde defaults so a config file only needs the values it
//! changes. Durations are written as integer milliseconds (`*_ms` keys).

use std::time::Duration;

use clinicflow_common::duration_millis;
use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_API_BASE_URL, DEFAULT_CACHE_TTL_MS, DEFAULT_HEALTH_TIMEOUT_MS, DEFAULT_LOGIN_PATH,
    DEFAULT_LOG_LEVEL, DEFAULT_REQUEST_TIMEOUT_MS, DEFAULT_RETRIES, DEFAULT_RETRY_DELAY_MS,
    DEFAULT_USER_AGENT,
};
use crate::errors::{ClinicError, Result};
use crate::types::RequestOptions;

/// Top-level configuration for the API client
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub api: ApiConfig,
    pub retry: RetryDefaults,
    pub cache: CacheSettings,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    #[serde(rename = "timeout_ms", with = "duration_millis")]
    pub timeout: Duration,
    #[serde(rename = "health_timeout_ms", with = "duration_millis")]
    pub health_timeout: Duration,
    /// Where the session handler sends the user after a 401
    pub login_path: String,
    pub user_agent: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_string(),
            timeout: Duration::from_millis(DEFAULT_REQUEST_TIMEOUT_MS),
            health_timeout: Duration::from_millis(DEFAULT_HEALTH_TIMEOUT_MS),
            login_path: DEFAULT_LOGIN_PATH.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// Defaults applied to calls that do not pass their own [`RequestOptions`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryDefaults {
    pub retries: u32,
    #[serde(rename = "retry_delay_ms", with = "duration_millis")]
    pub retry_delay: Duration,
}

impl Default for RetryDefaults {
    fn default() -> Self {
        Self { retries: DEFAULT_RETRIES, retry_delay: Duration::from_millis(DEFAULT_RETRY_DELAY_MS) }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    #[serde(rename = "default_ttl_ms", with = "duration_millis")]
    pub default_ttl: Duration,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_entries: Option<usize>,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self { default_ttl: Duration::from_millis(DEFAULT_CACHE_TTL_MS), max_entries: None }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `tracing` filter directive, e.g. `info` or `clinicflow_core=debug`
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: DEFAULT_LOG_LEVEL.to_string(), json: false }
    }
}

impl ClientConfig {
    /// Check values that serde cannot
    ///
    /// # Errors
    /// Returns `ClinicError::Config` for an unparsable or non-HTTP base URL,
    /// a zero timeout, or an empty login path.
    pub fn validate(&self) -> Result<()> {
        let url = url::Url::parse(&self.api.base_url).map_err(|e| {
            ClinicError::Config(format!("Invalid base URL '{}': {}", self.api.base_url, e))
        })?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(ClinicError::Config(format!(
                "Base URL must use http or https, got '{}'",
                url.scheme()
            )));
        }

        if self.api.timeout.is_zero() || self.api.health_timeout.is_zero() {
            return Err(ClinicError::Config("Timeouts must be greater than zero".to_string()));
        }

        if !self.api.login_path.starts_with('/') {
            return Err(ClinicError::Config(format!(
                "Login path must start with '/', got '{}'",
                self.api.login_path
            )));
        }

        Ok(())
    }

    /// Request options seeded from the retry section
    pub fn default_request_options(&self) -> RequestOptions {
        RequestOptions::new()
            .with_retries(self.retry.retries)
            .with_retry_delay(self.retry.retry_delay)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = ClientConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.api.health_timeout, Duration::from_secs(5));
        assert_eq!(config.cache.default_ttl, Duration::from_secs(300));
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config: ClientConfig = serde_json::from_value(json!({
            "api": { "base_url": "https://clinic.example/api", "timeout_ms": 2500 },
            "retry": { "retries": 1 }
        }))
        .unwrap();

        assert_eq!(config.api.timeout, Duration::from_millis(2500));
        assert_eq!(config.api.login_path, "/login");
        assert_eq!(config.retry.retries, 1);
        assert_eq!(config.retry.retry_delay, Duration::from_millis(1000));
    }

    #[test]
    fn rejects_bad_base_url() {
        let mut config = ClientConfig::default();
        config.api.base_url = "not a url".into();
        assert!(matches!(config.validate(), Err(ClinicError::Config(_))));

        config.api.base_url = "ftp://clinic.example".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn request_options_follow_retry_section() {
        let mut config = ClientConfig::default();
        config.retry.retries = 0;
        config.retry.retry_delay = Duration::from_millis(10);

        let options = config.default_request_options();
        assert_eq!(options.retries, 0);
        assert_eq!(options.retry_delay, Duration::from_millis(10));
    }
}
