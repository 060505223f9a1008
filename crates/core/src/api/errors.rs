//! API-specific error types
//!
//! Provides error classification for API operations with retry metadata and
//! the user-facing message for each category.

use std::borrow::Cow;

use clinicflow_common::impl_str_conversions;
use serde_json::Value;
use thiserror::Error;

use super::transport::{TransportError, TransportErrorCode};

/// Categories of API errors for retry and notification logic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiErrorCategory {
    /// 401 - credentials missing or expired
    Authentication,
    /// 403 - authenticated but not allowed
    Authorization,
    /// 404
    NotFound,
    /// 409 - duplicate or conflicting write
    Conflict,
    /// 400, 422
    Validation,
    /// 429 - retryable
    RateLimit,
    /// 500 and unlisted 5xx - retryable
    Server,
    /// 502, 503, 504 - retryable
    ServiceUnavailable,
    /// No response at all - retryable
    Network,
    /// Request timed out or was aborted - retryable
    Timeout,
    /// Other 4xx and rejected envelopes - non-retryable
    Client,
    /// Decoding, configuration and orchestration failures
    Internal,
}

impl_str_conversions!(ApiErrorCategory {
    Authentication => "authentication",
    Authorization => "authorization",
    NotFound => "not_found",
    Conflict => "conflict",
    Validation => "validation",
    RateLimit => "rate_limit",
    Server => "server",
    ServiceUnavailable => "service_unavailable",
    Network => "network",
    Timeout => "timeout",
    Client => "client",
    Internal => "internal",
});

pub const GENERIC_ERROR_MESSAGE: &str = "An unexpected error occurred. Please try again.";

/// API operation errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The server answered with `success: false`
    #[error("Request rejected: {message}")]
    Rejected { message: String },

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ApiError {
    /// HTTP status of the failed exchange, if there was one
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Transport(err) => err.status,
            _ => None,
        }
    }

    pub fn code(&self) -> Option<TransportErrorCode> {
        match self {
            Self::Transport(err) => err.code,
            _ => None,
        }
    }

    /// Raw error body returned by the server
    pub fn payload(&self) -> Option<&Value> {
        match self {
            Self::Transport(err) => err.payload.as_ref(),
            _ => None,
        }
    }

    /// Get the error category for this error
    pub fn category(&self) -> ApiErrorCategory {
        match self {
            Self::Transport(err) => match (err.status, err.code) {
                (Some(401), _) => ApiErrorCategory::Authentication,
                (Some(403), _) => ApiErrorCategory::Authorization,
                (Some(404), _) => ApiErrorCategory::NotFound,
                (Some(409), _) => ApiErrorCategory::Conflict,
                (Some(400 | 422), _) => ApiErrorCategory::Validation,
                (Some(429), _) => ApiErrorCategory::RateLimit,
                (Some(502..=504), _) => ApiErrorCategory::ServiceUnavailable,
                (Some(500..=599), _) => ApiErrorCategory::Server,
                (Some(_), _) => ApiErrorCategory::Client,
                (
                    None,
                    Some(TransportErrorCode::Timeout | TransportErrorCode::ConnectionAborted),
                ) => ApiErrorCategory::Timeout,
                (None, _) => ApiErrorCategory::Network,
            },
            Self::Rejected { .. } | Self::InvalidOperation(_) => ApiErrorCategory::Client,
            Self::Decode(_) | Self::Cancelled | Self::Config(_) => ApiErrorCategory::Internal,
        }
    }

    /// Check if this error should be retried
    ///
    /// Only transport failures are retried: no status, 429 or 5xx.
    pub fn should_retry(&self) -> bool {
        match self {
            Self::Transport(err) => match err.status {
                None => true,
                Some(status) => status == 429 || (500..=599).contains(&status),
            },
            _ => false,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Message suitable for a toast or banner
    pub fn user_message(&self) -> Cow<'static, str> {
        if let Self::Rejected { message } = self {
            return Cow::Owned(message.clone());
        }

        let message = match (self.status(), self.code()) {
            (Some(401), _) => "Your session has expired. Please log in again.",
            (Some(403), _) => "You do not have permission to perform this action.",
            (Some(404), _) => "The requested resource was not found.",
            (Some(409), _) => "This record conflicts with existing data. It may be a duplicate.",
            (Some(422), _) => "Validation failed. Please check the entered data.",
            (Some(429), _) => "Too many requests. Please wait a moment and try again.",
            (Some(500), _) => "A server error occurred. Please try again later.",
            (Some(502..=504), _) => "The service is temporarily unavailable. Please try again later.",
            (None, Some(TransportErrorCode::NetworkUnreachable)) => {
                "Unable to reach the server. Please check your network connection."
            }
            (None, Some(TransportErrorCode::Timeout)) => "The request timed out. Please try again.",
            (None, Some(TransportErrorCode::ConnectionAborted)) => {
                "The connection was interrupted. Please try again."
            }
            _ => GENERIC_ERROR_MESSAGE,
        };
        Cow::Borrowed(message)
    }
}
