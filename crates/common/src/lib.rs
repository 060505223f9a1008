//! Modular common utilities shared across ClinicFlow crates.
//!
//! # Feature Tiers
//!
//! Enable cargo features to opt into the tiers you need:
//! - `foundation`: serde helpers and enum string conversions
//! - `runtime`: async infrastructure (TTL cache, clock, retry)

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

// Foundation tier
// -----------------------------------------------------------------
#[cfg(feature = "foundation")]
#[macro_use]
pub mod utils;

// Runtime tier
// --------------------------------------------------------------------
#[cfg(feature = "runtime")]
pub mod cache;
#[cfg(feature = "runtime")]
pub mod resilience;

// Re-export commonly used types and traits for convenience
// ------------------------
#[cfg(feature = "runtime")]
pub use cache::{CacheConfig, CacheStats, TtlCache};
#[cfg(feature = "runtime")]
pub use resilience::{
    Clock, MockClock, RetryConfig, RetryDecision, RetryError, RetryExecutor, RetryOutcome,
    RetryPolicy, SystemClock,
};
#[cfg(feature = "foundation")]
pub use utils::macros::ParseEnumError;
#[cfg(feature = "foundation")]
pub use utils::serde::{duration_millis, option_duration_millis};
