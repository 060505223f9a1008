//! Response caching with structured keys

pub mod key;
pub mod response_cache;

pub use key::{canonical_json, CacheKey, CacheOperation};
pub use response_cache::ResponseCache;
