//! In-memory collaborators for tests
//!
//! Available to this crate's unit tests and, with the `test-utils`
//! feature, to downstream integration tests.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use clinicflow_domain::ApiErrorContext;
use parking_lot::Mutex;
use serde_json::{json, Value};

use crate::api::{
    ApiError, ErrorReporter, ErrorTags, HttpMethod, Notifier, RequestTiming, SessionHandler,
    Transport, TransportError, TransportRequest, TransportResponse, UserNotice,
};

/// Scripted answer for one route
#[derive(Debug, Clone)]
pub enum MockReply {
    Respond(TransportResponse),
    Fail(TransportError),
    /// Panics inside `execute`
    Panic(String),
}

type Route = (HttpMethod, String);

/// Transport answering from scripted routes
///
/// Queued replies (`push`) are consumed first, then the sticky reply set
/// with `on`. Unscripted routes fail with a 404.
#[derive(Debug, Default)]
pub struct MockTransport {
    sticky: Mutex<HashMap<Route, MockReply>>,
    queued: Mutex<HashMap<Route, VecDeque<MockReply>>>,
    requests: Mutex<Vec<TransportRequest>>,
    latency: Option<Duration>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every reply by `latency`
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Reply to every call on `method path`
    pub fn on(&self, method: HttpMethod, path: &str, reply: MockReply) {
        self.sticky.lock().insert((method, path.to_string()), reply);
    }

    /// Reply to the next unanswered call on `method path` only
    pub fn push(&self, method: HttpMethod, path: &str, reply: MockReply) {
        self.queued.lock().entry((method, path.to_string())).or_default().push_back(reply);
    }

    /// Sticky `{ success: true, data }` response
    pub fn respond_ok(&self, method: HttpMethod, path: &str, data: Value) {
        self.on(method, path, MockReply::Respond(envelope(data)));
    }

    /// Sticky HTTP failure with `status`
    pub fn fail_status(&self, method: HttpMethod, path: &str, status: u16) {
        self.on(method, path, MockReply::Fail(TransportError::http(method, path, status, None)));
    }

    pub fn requests(&self) -> Vec<TransportRequest> {
        self.requests.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().len()
    }

    pub fn calls_to(&self, method: HttpMethod, path: &str) -> usize {
        self.requests.lock().iter().filter(|r| r.method == method && r.path == path).count()
    }

    fn next_reply(&self, route: &Route) -> Option<MockReply> {
        if let Some(reply) = self.queued.lock().get_mut(route).and_then(VecDeque::pop_front) {
            return Some(reply);
        }
        self.sticky.lock().get(route).cloned()
    }
}

/// 200 response carrying a successful envelope around `data`
pub fn envelope(data: Value) -> TransportResponse {
    TransportResponse::ok(json!({ "success": true, "data": data }))
}

#[async_trait]
impl Transport for MockTransport {
    async fn execute(&self, request: TransportRequest) -> Result<TransportResponse, TransportError> {
        let route = (request.method, request.path.clone());
        self.requests.lock().push(request);

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        match self.next_reply(&route) {
            Some(MockReply::Respond(response)) => Ok(response),
            Some(MockReply::Fail(error)) => Err(error),
            Some(MockReply::Panic(message)) => panic!("{message}"),
            None => Err(TransportError::http(route.0, route.1, 404, None)),
        }
    }
}

/// Notifier keeping every notice
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<UserNotice>>,
}

impl RecordingNotifier {
    pub fn notices(&self) -> Vec<UserNotice> {
        self.notices.lock().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: UserNotice) {
        self.notices.lock().push(notice);
    }
}

/// Session handler counting its side effects
#[derive(Debug, Default)]
pub struct RecordingSession {
    cleared: AtomicUsize,
    redirected: AtomicUsize,
}

impl RecordingSession {
    pub fn cleared_count(&self) -> usize {
        self.cleared.load(Ordering::SeqCst)
    }

    pub fn redirect_count(&self) -> usize {
        self.redirected.load(Ordering::SeqCst)
    }
}

impl SessionHandler for RecordingSession {
    fn clear_credentials(&self) {
        self.cleared.fetch_add(1, Ordering::SeqCst);
    }

    fn redirect_to_login(&self) {
        self.redirected.fetch_add(1, Ordering::SeqCst);
    }
}

/// One `report_error` call
#[derive(Debug, Clone)]
pub struct ReportedError {
    pub error: ApiError,
    pub context: ApiErrorContext,
    pub tags: ErrorTags,
}

/// Reporter keeping every error report and timing
#[derive(Debug, Default)]
pub struct RecordingReporter {
    errors: Mutex<Vec<ReportedError>>,
    timings: Mutex<Vec<RequestTiming>>,
}

impl RecordingReporter {
    pub fn errors(&self) -> Vec<ReportedError> {
        self.errors.lock().clone()
    }

    pub fn timings(&self) -> Vec<RequestTiming> {
        self.timings.lock().clone()
    }
}

impl ErrorReporter for RecordingReporter {
    fn report_error(&self, error: &ApiError, context: &ApiErrorContext, tags: &ErrorTags) {
        self.errors.lock().push(ReportedError {
            error: error.clone(),
            context: context.clone(),
            tags: tags.clone(),
        });
    }

    fn record_timing(&self, timing: &RequestTiming) {
        self.timings.lock().push(timing.clone());
    }
}
