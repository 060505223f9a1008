//! Per-call request options

use std::collections::BTreeMap;
use std::time::Duration;

use clinicflow_common::{duration_millis, option_duration_millis};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::entity::EntityType;
use crate::constants::{DEFAULT_RETRIES, DEFAULT_RETRY_DELAY_MS};

/// Options recognized by every façade operation
///
/// Durations travel as integer milliseconds. Fields the core does not know
/// about (page, search, filters, ...) are kept in `extra`; they are ignored
/// by the pipeline but take part in list cache keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RequestOptions {
    /// Retries after the first attempt
    pub retries: u32,

    /// Base backoff delay, doubled after every failed attempt
    #[serde(with = "duration_millis")]
    pub retry_delay: Duration,

    /// `None` means reads are cached
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_cache: Option<bool>,

    /// `None` means the entity's default TTL
    #[serde(
        rename = "cacheTTL",
        with = "option_duration_millis",
        skip_serializing_if = "Option::is_none"
    )]
    pub cache_ttl: Option<Duration>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            retries: DEFAULT_RETRIES,
            retry_delay: Duration::from_millis(DEFAULT_RETRY_DELAY_MS),
            use_cache: None,
            cache_ttl: None,
            extra: BTreeMap::new(),
        }
    }
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    pub fn with_cache(mut self, enabled: bool) -> Self {
        self.use_cache = Some(enabled);
        self
    }

    /// Shorthand for `with_cache(false)`
    pub fn no_cache(self) -> Self {
        self.with_cache(false)
    }

    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = Some(ttl);
        self
    }

    /// Attach a passthrough field such as `page` or `search`
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Whether reads may be served from and stored into the cache
    pub fn cache_enabled(&self) -> bool {
        self.use_cache.unwrap_or(true)
    }

    /// TTL to store a read under for `entity`
    pub fn ttl_for(&self, entity: &EntityType) -> Duration {
        self.cache_ttl.unwrap_or_else(|| entity.default_ttl())
    }
}
