//! Response cache owned by the entity façade

use std::sync::Arc;
use std::time::Duration;

use clinicflow_common::cache::{CacheConfig, CacheStats, TtlCache};
use clinicflow_common::{Clock, SystemClock};
use clinicflow_domain::EntityType;
use serde_json::Value;
use tracing::debug;

use super::key::{CacheKey, CacheOperation};

/// TTL cache of unwrapped response payloads
///
/// Clones share the same entries.
#[derive(Clone)]
pub struct ResponseCache {
    entries: TtlCache<CacheKey, Value, Arc<dyn Clock>>,
}

impl Default for ResponseCache {
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}

impl ResponseCache {
    pub fn new(config: CacheConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Use a custom clock (e.g. `MockClock`) for deterministic expiry
    pub fn with_clock(config: CacheConfig, clock: Arc<dyn Clock>) -> Self {
        Self { entries: TtlCache::with_clock(config, clock) }
    }

    /// Fresh value for `key`; a stale entry is evicted and reported absent
    pub fn get(&self, key: &CacheKey) -> Option<Value> {
        let hit = self.entries.get(key);
        debug!(key = %key, hit = hit.is_some(), "Cache lookup");
        hit
    }

    /// Store `value`, replacing any existing entry
    pub fn set(&self, key: CacheKey, value: Value, ttl: Duration) {
        self.entries.insert_with_ttl(key, value, ttl);
    }

    /// Remove every entry whose rendered key contains `pattern`
    pub fn invalidate(&self, pattern: &str) -> usize {
        let removed = self.entries.invalidate_where(|key| key.to_string().contains(pattern));
        debug!(pattern, removed, "Cache invalidated by pattern");
        removed
    }

    /// Remove entries for `entity` by name, optionally narrowed by
    /// operation and discriminator (e.g. the id of a `get` entry)
    pub fn invalidate_scope(
        &self,
        operation: CacheOperation,
        entity: &EntityType,
        discriminator: Option<&str>,
    ) -> usize {
        let removed =
            self.entries.invalidate_where(|key| key.in_scope(operation, entity, discriminator));
        debug!(%operation, %entity, ?discriminator, removed, "Cache scope invalidated");
        removed
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Rendered keys currently stored, sorted
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.entries.keys().iter().map(ToString::to_string).collect();
        keys.sort();
        keys
    }

    pub fn stats(&self) -> CacheStats {
        self.entries.stats()
    }
}
