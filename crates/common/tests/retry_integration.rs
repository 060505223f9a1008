//! Integration tests for the retry executor
//!
//! Runs on a paused tokio clock so backoff schedules are asserted exactly.

#![cfg(feature = "runtime")]

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use clinicflow_common::resilience::{
    RetryConfig, RetryDecision, RetryError, RetryExecutor, RetryPolicy,
};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, PartialEq)]
enum Failure {
    Unavailable,
    BadRequest,
}

impl std::fmt::Display for Failure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

/// Mirrors how an HTTP client classifies failures.
struct StatusPolicy;

impl RetryPolicy<Failure> for StatusPolicy {
    fn should_retry(&self, error: &Failure, _attempt: u32) -> RetryDecision {
        match error {
            Failure::Unavailable => RetryDecision::Retry,
            Failure::BadRequest => RetryDecision::Stop,
        }
    }
}

/// Three retries doubling from one second wait 1s, 2s and 4s.
#[tokio::test(start_paused = true)]
async fn test_doubling_schedule_before_exhaustion() {
    let executor =
        RetryExecutor::new(RetryConfig::exponential(3, Duration::from_secs(1)), StatusPolicy);
    let calls = Arc::new(AtomicU32::new(0));
    let started = Instant::now();

    let counter = Arc::clone(&calls);
    let outcome = executor
        .execute_with_outcome(|| {
            counter.fetch_add(1, Ordering::SeqCst);
            async { Err::<(), _>(Failure::Unavailable) }
        })
        .await;

    assert_eq!(calls.load(Ordering::SeqCst), 4);
    assert_eq!(outcome.total_delay, Duration::from_secs(7));
    assert!(started.elapsed() >= Duration::from_secs(7));
    match outcome.result {
        Err(RetryError::Exhausted { attempts, source }) => {
            assert_eq!(attempts, 4);
            assert_eq!(source, Failure::Unavailable);
        }
        other => panic!("expected exhaustion, got {other:?}"),
    }
}

/// A success after one failure costs only the first wait.
#[tokio::test(start_paused = true)]
async fn test_recovers_after_single_retry() {
    let executor =
        RetryExecutor::new(RetryConfig::exponential(3, Duration::from_millis(250)), StatusPolicy);
    let calls = Arc::new(AtomicU32::new(0));

    let counter = Arc::clone(&calls);
    let outcome = executor
        .execute_with_outcome(|| {
            let n = counter.fetch_add(1, Ordering::SeqCst);
            async move {
                if n == 0 {
                    Err(Failure::Unavailable)
                } else {
                    Ok("done")
                }
            }
        })
        .await;

    assert_eq!(outcome.attempts, 2);
    assert_eq!(outcome.total_delay, Duration::from_millis(250));
    assert_eq!(outcome.result.ok(), Some("done"));
}

/// Non-retryable errors surface after exactly one call.
#[tokio::test(start_paused = true)]
async fn test_non_retryable_error_stops_immediately() {
    let executor =
        RetryExecutor::new(RetryConfig::exponential(3, Duration::from_secs(1)), StatusPolicy);
    let calls = Arc::new(AtomicU32::new(0));

    let counter = Arc::clone(&calls);
    let outcome = executor
        .execute_with_outcome(|| {
            counter.fetch_add(1, Ordering::SeqCst);
            async { Err::<(), _>(Failure::BadRequest) }
        })
        .await;

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(outcome.into_result().err().and_then(RetryError::into_source), Some(Failure::BadRequest));
}

/// Zero retries means a single attempt.
#[tokio::test(start_paused = true)]
async fn test_zero_retries_single_attempt() {
    let executor =
        RetryExecutor::new(RetryConfig::exponential(0, Duration::from_secs(1)), StatusPolicy);
    let calls = Arc::new(AtomicU32::new(0));

    let counter = Arc::clone(&calls);
    let outcome = executor
        .execute_with_outcome(|| {
            counter.fetch_add(1, Ordering::SeqCst);
            async { Err::<(), _>(Failure::Unavailable) }
        })
        .await;

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(outcome.total_delay, Duration::ZERO);
    assert!(matches!(outcome.result, Err(RetryError::Exhausted { attempts: 1, .. })));
}

/// Cancelling mid-backoff stops the loop without another attempt.
#[tokio::test(start_paused = true)]
async fn test_cancel_during_backoff() {
    let executor =
        RetryExecutor::new(RetryConfig::exponential(3, Duration::from_secs(10)), StatusPolicy);
    let token = CancellationToken::new();
    let calls = Arc::new(AtomicU32::new(0));

    let canceller = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(3)).await;
        canceller.cancel();
    });

    let counter = Arc::clone(&calls);
    let outcome = executor
        .execute_cancellable(
            || {
                counter.fetch_add(1, Ordering::SeqCst);
                async { Err::<(), _>(Failure::Unavailable) }
            },
            &token,
        )
        .await;

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(matches!(outcome.result, Err(RetryError::Cancelled { attempts: 1 })));
}
