//! Resilience patterns for fault tolerance and error handling
//!
//! This module provides **generic, reusable** building blocks:
//! - **Clock**: time abstraction so TTL and timing logic can be tested with a
//!   [`MockClock`]
//! - **Retry Logic**: retry executor with a pluggable policy, doubling
//!   backoff and cooperative cancellation
//!
//! Both are generic over the caller's error type; HTTP-specific decisions
//! (which status codes are worth retrying) live with the API client.

pub mod clock;
pub mod retry;

pub use clock::{Clock, MockClock, SystemClock};
pub use retry::{
    RetryConfig, RetryDecision, RetryError, RetryExecutor, RetryOutcome, RetryPolicy,
};
