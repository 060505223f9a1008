//! Port interfaces for the request pipeline
//!
//! These traits define the boundaries between the pipeline and
//! infrastructure: the HTTP transport, the browser-like session, the
//! user-notification channel, monitoring and the credential store.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use clinicflow_common::impl_str_conversions;
use clinicflow_domain::{ApiErrorContext, Result};
use serde::{Deserialize, Serialize};

use super::errors::ApiError;
use super::transport::{TransportError, TransportRequest, TransportResponse};

/// Performs one HTTP exchange
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: TransportRequest)
        -> std::result::Result<TransportResponse, TransportError>;
}

/// Session side effects triggered by a 401
pub trait SessionHandler: Send + Sync {
    /// Drop any stored bearer token
    fn clear_credentials(&self);

    /// Send the user to the login entry point
    fn redirect_to_login(&self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

impl_str_conversions!(NoticeLevel {
    Info => "info",
    Warning => "warning",
    Error => "error",
});

/// Message pushed to a toast/banner channel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserNotice {
    pub level: NoticeLevel,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,
}

impl UserNotice {
    pub fn error(message: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Error, message: message.into(), correlation_id: None }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Warning, message: message.into(), correlation_id: None }
    }

    pub fn with_correlation_id(mut self, id: impl Into<String>) -> Self {
        self.correlation_id = Some(id.into());
        self
    }
}

/// Surfaces user-facing failure messages
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: UserNotice);
}

/// Tags attached to every error report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorTags {
    pub error_type: String,
    pub status: Option<u16>,
    pub endpoint: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestOutcome {
    Success,
    Failure,
    Cancelled,
}

/// Performance span for one intercepted call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestTiming {
    pub correlation_id: String,
    /// `METHOD path`
    pub label: String,
    pub started_at: DateTime<Utc>,
    pub duration: Duration,
    pub attempts: u32,
    pub outcome: RequestOutcome,
}

/// Monitoring sink for failures and timings
pub trait ErrorReporter: Send + Sync {
    fn report_error(&self, error: &ApiError, context: &ApiErrorContext, tags: &ErrorTags);

    fn record_timing(&self, timing: &RequestTiming);
}

/// Persisted bearer token
pub trait CredentialStore: Send + Sync {
    fn load(&self) -> Result<Option<String>>;

    fn store(&self, token: &str) -> Result<()>;

    fn clear(&self) -> Result<()>;
}

/// Session handler that does nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSession;

impl SessionHandler for NoopSession {
    fn clear_credentials(&self) {}

    fn redirect_to_login(&self) {}
}

/// Notifier that drops every notice
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn notify(&self, _notice: UserNotice) {}
}

/// Reporter that discards reports and timings
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopReporter;

impl ErrorReporter for NoopReporter {
    fn report_error(&self, _error: &ApiError, _context: &ApiErrorContext, _tags: &ErrorTags) {}

    fn record_timing(&self, _timing: &RequestTiming) {}
}
