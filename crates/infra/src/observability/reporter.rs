use std::time::Duration;

use clinicflow_core::{ApiError, ErrorReporter, ErrorTags, RequestOutcome, RequestTiming};
use clinicflow_domain::ApiErrorContext;
use tracing::{debug, error, warn};

/// Calls slower than this are logged at `warn`
pub const DEFAULT_SLOW_REQUEST_THRESHOLD: Duration = Duration::from_secs(3);

/// [`ErrorReporter`] that writes structured `tracing` events.
///
/// Failures go out at `error`. Timings go out at `debug`, or at `warn` once
/// a call exceeds the slow-request threshold.
#[derive(Debug, Clone)]
pub struct TracingReporter {
    slow_threshold: Duration,
}

impl Default for TracingReporter {
    fn default() -> Self {
        Self { slow_threshold: DEFAULT_SLOW_REQUEST_THRESHOLD }
    }
}

impl TracingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_slow_threshold(mut self, threshold: Duration) -> Self {
        self.slow_threshold = threshold;
        self
    }

    pub fn is_slow(&self, timing: &RequestTiming) -> bool {
        timing.duration > self.slow_threshold
    }
}

impl ErrorReporter for TracingReporter {
    fn report_error(&self, err: &ApiError, context: &ApiErrorContext, tags: &ErrorTags) {
        error!(
            correlation_id = %context.correlation_id,
            method = %context.method,
            url = %context.url,
            status = ?context.status,
            error_type = %tags.error_type,
            endpoint = %tags.endpoint,
            timestamp = %context.timestamp.to_rfc3339(),
            error = %err,
            "API request failed"
        );
    }

    fn record_timing(&self, timing: &RequestTiming) {
        let duration_ms = u64::try_from(timing.duration.as_millis()).unwrap_or(u64::MAX);
        let outcome = match timing.outcome {
            RequestOutcome::Success => "success",
            RequestOutcome::Failure => "failure",
            RequestOutcome::Cancelled => "cancelled",
        };

        if self.is_slow(timing) {
            warn!(
                correlation_id = %timing.correlation_id,
                request = %timing.label,
                duration_ms,
                attempts = timing.attempts,
                outcome,
                "slow API request"
            );
        } else {
            debug!(
                correlation_id = %timing.correlation_id,
                request = %timing.label,
                duration_ms,
                attempts = timing.attempts,
                outcome,
                "API request timing"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn timing(duration: Duration) -> RequestTiming {
        RequestTiming {
            correlation_id: "req_1".into(),
            label: "GET /patients".into(),
            started_at: Utc::now(),
            duration,
            attempts: 1,
            outcome: RequestOutcome::Success,
        }
    }

    #[test]
    fn slow_threshold_is_exclusive() {
        let reporter = TracingReporter::new().with_slow_threshold(Duration::from_millis(500));

        assert!(!reporter.is_slow(&timing(Duration::from_millis(500))));
        assert!(reporter.is_slow(&timing(Duration::from_millis(501))));
        reporter.record_timing(&timing(Duration::from_secs(1)));
    }
}
