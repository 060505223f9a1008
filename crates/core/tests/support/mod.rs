//! Shared fixtures for `clinicflow-core` integration tests.
//!
//! Builds an [`EntityService`] wired to a scripted transport and recording
//! collaborators, with a mock clock driving cache expiry.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use clinicflow_common::cache::CacheConfig;
use clinicflow_common::MockClock;
use clinicflow_core::testing::{
    MockTransport, RecordingNotifier, RecordingReporter, RecordingSession,
};
use clinicflow_core::{EntityService, RequestInterceptor, ResponseCache};
use clinicflow_domain::RequestOptions;

pub struct Harness {
    pub transport: Arc<MockTransport>,
    pub notifier: Arc<RecordingNotifier>,
    pub session: Arc<RecordingSession>,
    pub reporter: Arc<RecordingReporter>,
    pub clock: MockClock,
    pub service: Arc<EntityService>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_transport(MockTransport::new())
    }

    pub fn with_transport(transport: MockTransport) -> Self {
        let transport = Arc::new(transport);
        let notifier = Arc::new(RecordingNotifier::default());
        let session = Arc::new(RecordingSession::default());
        let reporter = Arc::new(RecordingReporter::default());
        let clock = MockClock::new();

        let interceptor = RequestInterceptor::new(
            Arc::clone(&session) as _,
            Arc::clone(&notifier) as _,
            Arc::clone(&reporter) as _,
        );
        let cache = ResponseCache::with_clock(CacheConfig::default(), Arc::new(clock.clone()));
        let service = EntityService::new(Arc::clone(&transport) as _)
            .with_interceptor(Arc::new(interceptor))
            .with_cache(cache);

        Self { transport, notifier, session, reporter, clock, service: Arc::new(service) }
    }
}

/// Options with a 1ms base delay so retries finish quickly on a paused clock
pub fn fast_options(retries: u32) -> RequestOptions {
    RequestOptions::new().with_retries(retries).with_retry_delay(Duration::from_millis(1))
}
