//! Cache configuration types and builder patterns

use std::time::Duration;

/// Five minutes, the freshness window used when a caller gives no TTL.
pub const DEFAULT_TTL: Duration = Duration::from_millis(300_000);

/// Configuration for cache behavior
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// TTL applied by [`TtlCache::insert`](super::TtlCache::insert)
    pub default_ttl: Duration,

    /// Maximum number of entries (None = unlimited). When full, the oldest
    /// insertion is evicted first.
    pub max_entries: Option<usize>,

    /// Whether to collect hit/miss/expiration counters
    pub track_metrics: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { default_ttl: DEFAULT_TTL, max_entries: None, track_metrics: true }
    }
}

impl CacheConfig {
    /// Create a new configuration builder
    pub fn builder() -> CacheConfigBuilder {
        CacheConfigBuilder::default()
    }

    /// Quick preset for an unbounded cache with the given default TTL
    ///
    /// # Example
    /// ```
    /// use std::time::Duration;
    ///
    /// use clinicflow_common::cache::CacheConfig;
    ///
    /// let config = CacheConfig::ttl(Duration::from_secs(60));
    /// assert_eq!(config.max_entries, None);
    /// ```
    pub fn ttl(duration: Duration) -> Self {
        Self { default_ttl: duration, ..Self::default() }
    }
}

/// Builder for CacheConfig with fluent API
#[derive(Debug, Default)]
pub struct CacheConfigBuilder {
    config: CacheConfig,
}

impl CacheConfigBuilder {
    /// Set the TTL used when inserting without an explicit TTL
    pub fn default_ttl(mut self, duration: Duration) -> Self {
        self.config.default_ttl = duration;
        self
    }

    /// Bound the number of entries
    pub fn max_entries(mut self, size: usize) -> Self {
        self.config.max_entries = Some(size);
        self
    }

    /// Enable or disable metrics tracking
    pub fn track_metrics(mut self, enabled: bool) -> Self {
        self.config.track_metrics = enabled;
        self
    }

    /// Build the configuration
    pub fn build(self) -> CacheConfig {
        self.config
    }
}
