//! Request interceptor
//!
//! Gives every outbound call the same lifecycle: correlation id, active
//! tracking, timing, retry with exponential backoff, and on terminal failure
//! a report plus the status-specific side effects.

use std::future::Future;
use std::sync::Arc;

use chrono::Utc;
use clinicflow_common::{RetryConfig, RetryError, RetryExecutor};
use clinicflow_domain::{ApiErrorContext, RequestOptions};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, info_span, warn, Instrument};

use super::correlation::{new_correlation_id, ActiveRequests};
use super::policy::HttpRetryPolicy;
use crate::api::{
    ApiError, ApiErrorCategory, ErrorReporter, ErrorTags, HttpMethod, NoopNotifier, NoopReporter,
    NoopSession, Notifier, RequestOutcome, RequestTiming, SessionHandler, UserNotice,
};

/// What an intercepted call is doing, for logs and error context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestDescriptor {
    pub method: HttpMethod,
    pub path: String,
}

impl RequestDescriptor {
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self { method, path: path.into() }
    }

    /// `METHOD path`
    pub fn label(&self) -> String {
        format!("{} {}", self.method, self.path)
    }
}

pub struct RequestInterceptor {
    session: Arc<dyn SessionHandler>,
    notifier: Arc<dyn Notifier>,
    reporter: Arc<dyn ErrorReporter>,
    active: ActiveRequests,
}

impl Default for RequestInterceptor {
    fn default() -> Self {
        Self::new(Arc::new(NoopSession), Arc::new(NoopNotifier), Arc::new(NoopReporter))
    }
}

impl RequestInterceptor {
    pub fn new(
        session: Arc<dyn SessionHandler>,
        notifier: Arc<dyn Notifier>,
        reporter: Arc<dyn ErrorReporter>,
    ) -> Self {
        Self { session, notifier, reporter, active: ActiveRequests::default() }
    }

    pub fn with_session(mut self, session: Arc<dyn SessionHandler>) -> Self {
        self.session = session;
        self
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn with_reporter(mut self, reporter: Arc<dyn ErrorReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    /// Correlation ids of calls currently in flight, sorted
    pub fn active_requests(&self) -> Vec<String> {
        self.active.snapshot()
    }

    pub fn active_request_count(&self) -> usize {
        self.active.len()
    }

    /// Run `request_fn` (one attempt per call) under the full lifecycle.
    ///
    /// Returns the first success, or the last underlying error once retries
    /// are exhausted or a non-retryable error occurs.
    pub async fn intercept<T, F, Fut>(
        &self,
        descriptor: &RequestDescriptor,
        options: &RequestOptions,
        request_fn: F,
    ) -> Result<T, ApiError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ApiError>>,
    {
        self.run(descriptor, options, request_fn, None).await
    }

    /// Like [`intercept`](Self::intercept), aborting when `token` fires.
    ///
    /// The token is checked before each attempt and raced against each
    /// backoff sleep. A cancelled call yields [`ApiError::Cancelled`] and is
    /// neither reported nor notified.
    pub async fn intercept_cancellable<T, F, Fut>(
        &self,
        descriptor: &RequestDescriptor,
        options: &RequestOptions,
        request_fn: F,
        token: &CancellationToken,
    ) -> Result<T, ApiError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ApiError>>,
    {
        self.run(descriptor, options, request_fn, Some(token)).await
    }

    async fn run<T, F, Fut>(
        &self,
        descriptor: &RequestDescriptor,
        options: &RequestOptions,
        request_fn: F,
        token: Option<&CancellationToken>,
    ) -> Result<T, ApiError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ApiError>>,
    {
        let correlation_id = new_correlation_id();
        let _guard = self.active.track(&correlation_id);

        let span = info_span!(
            "api_request",
            correlation_id = %correlation_id,
            method = %descriptor.method,
            path = %descriptor.path,
        );

        self.run_tracked(&correlation_id, descriptor, options, request_fn, token)
            .instrument(span)
            .await
    }

    async fn run_tracked<T, F, Fut>(
        &self,
        correlation_id: &str,
        descriptor: &RequestDescriptor,
        options: &RequestOptions,
        request_fn: F,
        token: Option<&CancellationToken>,
    ) -> Result<T, ApiError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ApiError>>,
    {
        let started_at = Utc::now();
        let started = Instant::now();

        let executor = RetryExecutor::new(
            RetryConfig::exponential(options.retries, options.retry_delay),
            HttpRetryPolicy,
        );
        let outcome = match token {
            Some(token) => executor.execute_cancellable(request_fn, token).await,
            None => executor.execute_with_outcome(request_fn).await,
        };
        let attempts = outcome.attempts;

        let result = match outcome.result {
            Ok(value) => Ok(value),
            Err(RetryError::Exhausted { source, .. } | RetryError::NonRetryable { source }) => {
                Err(source)
            }
            Err(RetryError::Cancelled { .. }) => Err(ApiError::Cancelled),
            Err(RetryError::InvalidConfiguration { message }) => Err(ApiError::Config(message)),
        };

        let duration = started.elapsed();
        let request_outcome = match &result {
            Ok(_) => RequestOutcome::Success,
            Err(err) if err.is_cancelled() => RequestOutcome::Cancelled,
            Err(_) => RequestOutcome::Failure,
        };
        self.reporter.record_timing(&RequestTiming {
            correlation_id: correlation_id.to_string(),
            label: descriptor.label(),
            started_at,
            duration,
            attempts,
            outcome: request_outcome,
        });

        match &result {
            Ok(_) => {
                debug!(attempts, elapsed_ms = duration.as_millis() as u64, "Request completed");
            }
            Err(err) if err.is_cancelled() => {
                info!(attempts, "Request cancelled");
            }
            Err(err) => self.handle_failure(err, correlation_id, descriptor, options),
        }

        result
    }

    fn handle_failure(
        &self,
        error: &ApiError,
        correlation_id: &str,
        descriptor: &RequestDescriptor,
        options: &RequestOptions,
    ) {
        let status = error.status();
        let category = error.category();
        let url = match error {
            ApiError::Transport(err) => err.url.clone(),
            _ => descriptor.path.clone(),
        };

        warn!(
            status = ?status,
            category = %category,
            error = %error,
            "Request failed"
        );

        let context = ApiErrorContext {
            correlation_id: correlation_id.to_string(),
            timestamp: Utc::now(),
            url,
            method: descriptor.method.to_string(),
            status,
            response: error.payload().cloned(),
            options: options.clone(),
        };
        let tags = ErrorTags {
            error_type: category.to_string(),
            status,
            endpoint: descriptor.path.clone(),
        };
        self.reporter.report_error(error, &context, &tags);

        if category == ApiErrorCategory::Authentication {
            self.session.clear_credentials();
            self.session.redirect_to_login();
            return;
        }

        let message = error.user_message();
        let notice = match category {
            ApiErrorCategory::RateLimit
            | ApiErrorCategory::ServiceUnavailable
            | ApiErrorCategory::Network
            | ApiErrorCategory::Timeout => UserNotice::warning(message),
            _ => UserNotice::error(message),
        };
        self.notifier.notify(notice.with_correlation_id(correlation_id));
    }
}
