//! Retry executor with doubling backoff and cooperative cancellation
//!
//! A [`RetryPolicy`] decides per error whether another attempt is worthwhile.
//! Waits double from the configured initial delay, and an optional
//! [`CancellationToken`] aborts the loop before an attempt or during a wait.
//!
//! When attempts run out the executor hands back the last underlying error
//! inside [`RetryError::Exhausted`] so callers can still classify it.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Errors that can occur during retry operations
#[derive(Debug, Error)]
pub enum RetryError<E> {
    /// All retry attempts have been exhausted; carries the last error seen
    #[error("All retry attempts exhausted after {attempts} tries: {source}")]
    Exhausted { attempts: u32, source: E },

    /// The operation failed with a non-retryable error
    #[error("Operation failed with non-retryable error: {source}")]
    NonRetryable { source: E },

    /// The cancellation token fired before the operation completed
    #[error("Retry cancelled after {attempts} attempts")]
    Cancelled { attempts: u32 },

    /// The retry configuration is invalid
    #[error("Invalid retry configuration: {message}")]
    InvalidConfiguration { message: String },
}

impl<E> RetryError<E> {
    /// Extract the underlying operation error, if there is one.
    pub fn into_source(self) -> Option<E> {
        match self {
            Self::Exhausted { source, .. } | Self::NonRetryable { source } => Some(source),
            Self::Cancelled { .. } | Self::InvalidConfiguration { .. } => None,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }
}

/// Result of one executor run plus how much it cost
#[derive(Debug)]
pub struct RetryOutcome<T, E> {
    pub result: Result<T, RetryError<E>>,
    /// Number of times the operation was invoked
    pub attempts: u32,
    /// Total time spent sleeping between attempts
    pub total_delay: Duration,
}

impl<T, E> RetryOutcome<T, E> {
    pub fn into_result(self) -> Result<T, RetryError<E>> {
        self.result
    }
}

/// Decides whether a failed attempt is worth repeating
pub trait RetryPolicy<E> {
    fn should_retry(&self, error: &E, attempt: u32) -> RetryDecision;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    Retry,
    Stop,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryConfig {
    /// Initial try plus retries
    pub max_attempts: u32,
    /// Wait after the first failure; doubled after each further failure
    pub initial_delay: Duration,
}

impl RetryConfig {
    /// `retries` additional attempts after the first, doubling from
    /// `retry_delay`.
    pub fn exponential(retries: u32, retry_delay: Duration) -> Self {
        Self { max_attempts: retries.saturating_add(1), initial_delay: retry_delay }
    }

    /// Wait that follows the given 0-based attempt: `initial_delay * 2^attempt`
    pub fn delay_after(&self, attempt: u32) -> Duration {
        2u32.checked_pow(attempt)
            .and_then(|factor| self.initial_delay.checked_mul(factor))
            .unwrap_or(Duration::MAX)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.max_attempts == 0 {
            return Err("max_attempts must be greater than 0".to_string());
        }
        Ok(())
    }
}

pub struct RetryExecutor<P> {
    config: RetryConfig,
    policy: P,
}

impl<P> RetryExecutor<P> {
    pub fn new(config: RetryConfig, policy: P) -> Self {
        Self { config, policy }
    }

    /// Run `operation` until it succeeds, the policy stops, or attempts run
    /// out.
    pub async fn execute_with_outcome<F, Fut, T, E>(&self, operation: F) -> RetryOutcome<T, E>
    where
        P: RetryPolicy<E>,
        E: fmt::Display,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        self.run(operation, None).await
    }

    /// Like [`execute_with_outcome`](Self::execute_with_outcome), aborting as
    /// soon as `token` is cancelled.
    ///
    /// The token is checked before every attempt and raced against every
    /// backoff sleep. An attempt already in flight is allowed to finish.
    pub async fn execute_cancellable<F, Fut, T, E>(
        &self,
        operation: F,
        token: &CancellationToken,
    ) -> RetryOutcome<T, E>
    where
        P: RetryPolicy<E>,
        E: fmt::Display,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        self.run(operation, Some(token)).await
    }

    async fn run<F, Fut, T, E>(
        &self,
        mut operation: F,
        token: Option<&CancellationToken>,
    ) -> RetryOutcome<T, E>
    where
        P: RetryPolicy<E>,
        E: fmt::Display,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let mut attempt: u32 = 0;
        let mut total_delay = Duration::ZERO;
        let finish = |result: Result<T, RetryError<E>>, attempts: u32, total_delay: Duration| {
            RetryOutcome { result, attempts, total_delay }
        };

        if let Err(message) = self.config.validate() {
            return finish(Err(RetryError::InvalidConfiguration { message }), 0, total_delay);
        }
        let max_attempts = self.config.max_attempts;

        loop {
            if token.is_some_and(CancellationToken::is_cancelled) {
                debug!(attempts = attempt, "Retry loop cancelled before attempt");
                return finish(Err(RetryError::Cancelled { attempts: attempt }), attempt, total_delay);
            }

            debug!("Executing operation (attempt {}/{})", attempt + 1, max_attempts);

            let error = match operation().await {
                Ok(value) => {
                    if attempt > 0 {
                        debug!("Operation succeeded after {} retries", attempt);
                    }
                    return finish(Ok(value), attempt + 1, total_delay);
                }
                Err(error) => error,
            };

            if self.policy.should_retry(&error, attempt) == RetryDecision::Stop {
                debug!(error = %error, "Retry policy determined not to retry");
                return finish(Err(RetryError::NonRetryable { source: error }), attempt + 1, total_delay);
            }

            if attempt + 1 >= max_attempts {
                warn!(attempts = attempt + 1, error = %error, "All retry attempts exhausted");
                return finish(
                    Err(RetryError::Exhausted { attempts: attempt + 1, source: error }),
                    attempt + 1,
                    total_delay,
                );
            }

            let delay = self.config.delay_after(attempt);
            warn!("Operation failed (attempt {}), retrying after {:?}: {}", attempt + 1, delay, error);

            if !sleep(delay, token).await {
                debug!(attempts = attempt + 1, "Retry loop cancelled during backoff");
                return finish(
                    Err(RetryError::Cancelled { attempts: attempt + 1 }),
                    attempt + 1,
                    total_delay,
                );
            }

            total_delay += delay;
            attempt += 1;
        }
    }
}

/// Returns `false` when the wait was interrupted by cancellation.
async fn sleep(delay: Duration, token: Option<&CancellationToken>) -> bool {
    match token {
        Some(token) => {
            tokio::select! {
                () = token.cancelled() => false,
                () = tokio::time::sleep(delay) => true,
            }
        }
        None => {
            tokio::time::sleep(delay).await;
            true
        }
    }
}
