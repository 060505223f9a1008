//! Core cache implementation with per-entry time-to-live
//!
//! Every entry records when it was inserted and how long it stays fresh.
//! Freshness is checked lazily: an expired entry is removed the next time it
//! is looked up (or by an explicit [`TtlCache::cleanup_expired`] call), never
//! by a background sweeper.

use std::collections::{HashMap, VecDeque};
use std::hash::Hash;
use std::sync::{Arc, PoisonError, RwLock, RwLockWriteGuard};
use std::time::{Duration, Instant};

use super::config::CacheConfig;
use super::stats::{CacheStats, MetricsCollector};
use crate::resilience::{Clock, SystemClock};

/// Entry stored in the cache with its own freshness window
#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    inserted_at: Instant,
    ttl: Duration,
}

impl<V> CacheEntry<V> {
    fn is_fresh(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.inserted_at) < self.ttl
    }
}

#[derive(Debug)]
struct CacheStorage<K, V> {
    entries: HashMap<K, CacheEntry<V>>,
    /// Insertion order, used only when `max_entries` is set
    insertion_order: VecDeque<K>,
}

impl<K, V> CacheStorage<K, V>
where
    K: Eq + Hash + Clone,
{
    fn new() -> Self {
        Self { entries: HashMap::new(), insertion_order: VecDeque::new() }
    }

    fn remove(&mut self, key: &K) -> Option<CacheEntry<V>> {
        let removed = self.entries.remove(key);
        if removed.is_some() {
            self.insertion_order.retain(|k| k != key);
        }
        removed
    }

    fn retain(&mut self, mut keep: impl FnMut(&K, &CacheEntry<V>) -> bool) -> usize {
        let before = self.entries.len();
        self.entries.retain(|k, entry| keep(k, entry));
        let entries = &self.entries;
        self.insertion_order.retain(|k| entries.contains_key(k));
        before - self.entries.len()
    }
}

/// Generic thread-safe cache with per-entry TTL
///
/// Clones share storage and counters, so a cache can be handed to several
/// owners without an extra `Arc`.
///
/// # Example
/// ```
/// use std::time::Duration;
///
/// use clinicflow_common::cache::{CacheConfig, TtlCache};
///
/// let cache: TtlCache<String, i32> = TtlCache::new(CacheConfig::default());
/// cache.insert_with_ttl("key".to_string(), 42, Duration::from_secs(5));
/// assert_eq!(cache.get(&"key".to_string()), Some(42));
/// ```
pub struct TtlCache<K, V, C = SystemClock>
where
    K: Eq + Hash + Clone,
    V: Clone,
    C: Clock,
{
    storage: Arc<RwLock<CacheStorage<K, V>>>,
    config: CacheConfig,
    metrics: MetricsCollector,
    clock: C,
}

impl<K, V> TtlCache<K, V, SystemClock>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Create a new cache with the given configuration using system clock
    pub fn new(config: CacheConfig) -> Self {
        Self::with_clock(config, SystemClock)
    }
}

impl<K, V, C> TtlCache<K, V, C>
where
    K: Eq + Hash + Clone,
    V: Clone,
    C: Clock + Clone,
{
    /// Create a new cache with a custom clock (useful for testing)
    pub fn with_clock(config: CacheConfig, clock: C) -> Self {
        Self {
            storage: Arc::new(RwLock::new(CacheStorage::new())),
            config,
            metrics: MetricsCollector::default(),
            clock,
        }
    }

    /// Configuration this cache was built with
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Insert a value with the configured default TTL
    pub fn insert(&self, key: K, value: V) {
        self.insert_with_ttl(key, value, self.config.default_ttl);
    }

    /// Insert a value, unconditionally replacing any existing entry
    pub fn insert_with_ttl(&self, key: K, value: V, ttl: Duration) {
        let mut storage = self.write();

        if let Some(max_entries) = self.config.max_entries {
            if !storage.entries.contains_key(&key) {
                while storage.entries.len() >= max_entries.max(1) {
                    let Some(oldest) = storage.insertion_order.pop_front() else { break };
                    storage.entries.remove(&oldest);
                    if self.config.track_metrics {
                        self.metrics.record_eviction();
                    }
                }
            }
        }

        let entry = CacheEntry { value, inserted_at: self.clock.now(), ttl };
        if storage.entries.insert(key.clone(), entry).is_some() {
            storage.insertion_order.retain(|k| k != &key);
        }
        storage.insertion_order.push_back(key);

        if self.config.track_metrics {
            self.metrics.record_insert();
        }
    }

    /// Get a value from the cache
    ///
    /// Returns `None` if the key doesn't exist or if the entry has expired;
    /// an expired entry is removed as part of the lookup.
    pub fn get(&self, key: &K) -> Option<V> {
        let now = self.clock.now();
        let mut storage = self.write();

        let fresh = match storage.entries.get(key) {
            Some(entry) => entry.is_fresh(now),
            None => {
                self.record_miss();
                return None;
            }
        };

        if !fresh {
            storage.remove(key);
            if self.config.track_metrics {
                self.metrics.record_miss();
                self.metrics.record_expirations(1);
            }
            return None;
        }

        if self.config.track_metrics {
            self.metrics.record_hit();
        }
        storage.entries.get(key).map(|entry| entry.value.clone())
    }

    /// Check whether a fresh entry exists without touching counters
    pub fn contains_key(&self, key: &K) -> bool {
        let now = self.clock.now();
        self.storage
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .entries
            .get(key)
            .is_some_and(|entry| entry.is_fresh(now))
    }

    /// Remove a value from the cache
    pub fn remove(&self, key: &K) -> Option<V> {
        self.write().remove(key).map(|entry| entry.value)
    }

    /// Remove every entry whose key matches `predicate`
    ///
    /// Returns the number of entries removed.
    pub fn invalidate_where<F>(&self, predicate: F) -> usize
    where
        F: Fn(&K) -> bool,
    {
        let removed = self.write().retain(|key, _| !predicate(key));
        if self.config.track_metrics && removed > 0 {
            self.metrics.record_invalidations(removed as u64);
        }
        removed
    }

    /// Clear all entries from the cache
    pub fn clear(&self) {
        let mut storage = self.write();
        storage.entries.clear();
        storage.insertion_order.clear();

        if self.config.track_metrics {
            self.metrics.reset();
        }
    }

    /// Remove expired entries
    ///
    /// Returns the number of entries removed.
    pub fn cleanup_expired(&self) -> usize {
        let now = self.clock.now();
        let removed = self.write().retain(|_, entry| entry.is_fresh(now));
        if self.config.track_metrics && removed > 0 {
            self.metrics.record_expirations(removed as u64);
        }
        removed
    }

    /// Snapshot of the keys currently stored (fresh or not)
    pub fn keys(&self) -> Vec<K> {
        self.storage.read().unwrap_or_else(PoisonError::into_inner).entries.keys().cloned().collect()
    }

    /// Get the current number of entries
    pub fn len(&self) -> usize {
        self.storage.read().unwrap_or_else(PoisonError::into_inner).entries.len()
    }

    /// Check if the cache is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        self.metrics.snapshot(self.len())
    }

    fn record_miss(&self) {
        if self.config.track_metrics {
            self.metrics.record_miss();
        }
    }

    fn write(&self) -> RwLockWriteGuard<'_, CacheStorage<K, V>> {
        self.storage.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<K, V, C> Clone for TtlCache<K, V, C>
where
    K: Eq + Hash + Clone,
    V: Clone,
    C: Clock + Clone,
{
    fn clone(&self) -> Self {
        Self {
            storage: Arc::clone(&self.storage),
            config: self.config.clone(),
            metrics: self.metrics.clone(),
            clock: self.clock.clone(),
        }
    }
}
