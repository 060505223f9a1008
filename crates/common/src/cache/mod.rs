//! Generic in-process cache with per-entry time-to-live
//!
//! # Features
//!
//! - **Thread-safe**: clones share one `Arc<RwLock<..>>`-backed store
//! - **Generic**: works with any `K: Eq + Hash + Clone` and `V: Clone`
//! - **Per-entry TTL**: each insert may choose its own freshness window
//! - **Lazy expiry**: stale entries are dropped when looked up
//! - **Predicate invalidation**: remove every entry whose key matches
//! - **Metrics tracking**: hit/miss/expiration/invalidation statistics
//! - **Testable**: clock abstraction for deterministic time-based testing
//!
//! # Example
//! ```
//! use std::time::Duration;
//!
//! use clinicflow_common::cache::{CacheConfig, TtlCache};
//!
//! let cache: TtlCache<String, String> = TtlCache::new(CacheConfig::ttl(Duration::from_secs(300)));
//! cache.insert("list_Patient_{}".to_string(), "[]".to_string());
//! cache.invalidate_where(|key| key.starts_with("list_Patient"));
//! assert!(cache.is_empty());
//! ```

mod config;
mod stats;
mod ttl;

pub use config::{CacheConfig, CacheConfigBuilder, DEFAULT_TTL};
pub use stats::CacheStats;
pub use ttl::TtlCache;
