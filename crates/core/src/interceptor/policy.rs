use clinicflow_common::{RetryDecision, RetryPolicy};

use crate::api::ApiError;

/// Retries network failures, 429 and 5xx; stops on everything else
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpRetryPolicy;

impl RetryPolicy<ApiError> for HttpRetryPolicy {
    fn should_retry(&self, error: &ApiError, _attempt: u32) -> RetryDecision {
        if error.should_retry() {
            RetryDecision::Retry
        } else {
            RetryDecision::Stop
        }
    }
}
