//! Integration tests for the request interceptor
//!
//! Runs on a paused tokio clock so the backoff schedule is asserted exactly.

mod support;

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use clinicflow_core::testing::{RecordingNotifier, RecordingReporter, RecordingSession};
use clinicflow_core::{
    ApiError, HttpMethod, NoticeLevel, RequestDescriptor, RequestInterceptor, RequestOutcome,
    TransportError, TransportErrorCode,
};
use clinicflow_domain::RequestOptions;
use parking_lot::Mutex;
use support::fast_options;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

struct Fixture {
    interceptor: RequestInterceptor,
    notifier: Arc<RecordingNotifier>,
    session: Arc<RecordingSession>,
    reporter: Arc<RecordingReporter>,
}

fn fixture() -> Fixture {
    let notifier = Arc::new(RecordingNotifier::default());
    let session = Arc::new(RecordingSession::default());
    let reporter = Arc::new(RecordingReporter::default());
    let interceptor = RequestInterceptor::new(
        Arc::clone(&session) as _,
        Arc::clone(&notifier) as _,
        Arc::clone(&reporter) as _,
    );
    Fixture { interceptor, notifier, session, reporter }
}

fn descriptor() -> RequestDescriptor {
    RequestDescriptor::new(HttpMethod::Get, "/patients")
}

fn http_error(status: u16) -> ApiError {
    TransportError::http(HttpMethod::Get, "http://api.test/patients", status, None).into()
}

#[tokio::test(start_paused = true)]
async fn retries_with_doubling_backoff_until_success() {
    let f = fixture();
    let attempts = Mutex::new(Vec::new());
    let options =
        RequestOptions::new().with_retries(3).with_retry_delay(Duration::from_millis(100));

    let value = f
        .interceptor
        .intercept(&descriptor(), &options, || {
            let mut seen = attempts.lock();
            seen.push(Instant::now());
            let failing = seen.len() <= 2;
            async move { if failing { Err(http_error(503)) } else { Ok("done") } }
        })
        .await
        .unwrap();

    assert_eq!(value, "done");
    let attempts = attempts.lock();
    assert_eq!(attempts.len(), 3);
    assert_eq!(attempts[1] - attempts[0], Duration::from_millis(100));
    assert_eq!(attempts[2] - attempts[1], Duration::from_millis(200));

    assert!(f.reporter.errors().is_empty());
    assert!(f.notifier.notices().is_empty());
    let timings = f.reporter.timings();
    assert_eq!(timings.len(), 1);
    assert_eq!(timings[0].attempts, 3);
    assert_eq!(timings[0].outcome, RequestOutcome::Success);
    assert_eq!(timings[0].label, "GET /patients");
}

#[tokio::test(start_paused = true)]
async fn client_errors_are_not_retried() {
    for status in [400, 401, 403, 404, 409, 422] {
        let f = fixture();
        let calls = AtomicU32::new(0);

        let err = f
            .interceptor
            .intercept(&descriptor(), &fast_options(5), || {
                calls.fetch_add(1, Ordering::SeqCst);
                async move { Err::<(), _>(http_error(status)) }
            })
            .await
            .unwrap_err();

        assert_eq!(calls.load(Ordering::SeqCst), 1, "status {status}");
        assert_eq!(err.status(), Some(status));
    }
}

#[tokio::test(start_paused = true)]
async fn rate_limit_is_retried() {
    let f = fixture();
    let calls = AtomicU32::new(0);

    let err = f
        .interceptor
        .intercept(&descriptor(), &fast_options(2), || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err::<(), _>(http_error(429)) }
        })
        .await
        .unwrap_err();

    assert_eq!(calls.load(Ordering::SeqCst), 3);
    assert_eq!(err.status(), Some(429));

    let notices = f.notifier.notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].level, NoticeLevel::Warning);
}

#[tokio::test(start_paused = true)]
async fn unauthorized_clears_session_without_notice() {
    let f = fixture();

    let err = f
        .interceptor
        .intercept(&descriptor(), &fast_options(3), || async { Err::<(), _>(http_error(401)) })
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(401));
    assert_eq!(f.session.cleared_count(), 1);
    assert_eq!(f.session.redirect_count(), 1);
    assert!(f.notifier.notices().is_empty());
    assert_eq!(f.reporter.errors().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn failure_is_reported_with_context() {
    let f = fixture();
    let options = fast_options(0).with_param("page", 3);

    let _ = f
        .interceptor
        .intercept(&descriptor(), &options, || async { Err::<(), _>(http_error(404)) })
        .await;

    let reports = f.reporter.errors();
    assert_eq!(reports.len(), 1);
    let report = &reports[0];
    assert!(report.context.correlation_id.starts_with("req_"));
    assert_eq!(report.context.url, "http://api.test/patients");
    assert_eq!(report.context.method, "GET");
    assert_eq!(report.context.status, Some(404));
    assert_eq!(report.context.options, options);
    assert_eq!(report.tags.error_type, "not_found");
    assert_eq!(report.tags.endpoint, "/patients");

    let notices = f.notifier.notices();
    assert_eq!(notices[0].level, NoticeLevel::Error);
    assert_eq!(notices[0].correlation_id.as_deref(), Some(report.context.correlation_id.as_str()));
}

#[tokio::test(start_paused = true)]
async fn network_failures_use_dedicated_messages() {
    let f = fixture();

    let err = f
        .interceptor
        .intercept(&descriptor(), &fast_options(1), || async {
            Err::<(), _>(ApiError::from(TransportError::network(
                HttpMethod::Get,
                "/patients",
                TransportErrorCode::NetworkUnreachable,
                "dns failure",
            )))
        })
        .await
        .unwrap_err();

    assert_eq!(err.code(), Some(TransportErrorCode::NetworkUnreachable));
    let notices = f.notifier.notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].message, err.user_message());
    assert_eq!(notices[0].level, NoticeLevel::Warning);
}

#[tokio::test(start_paused = true)]
async fn cancellation_stops_retries_silently() {
    let f = fixture();
    let token = CancellationToken::new();
    let calls = AtomicU32::new(0);
    let options =
        RequestOptions::new().with_retries(5).with_retry_delay(Duration::from_secs(1));

    let canceller = {
        let token = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(1500)).await;
            token.cancel();
        })
    };

    let err = f
        .interceptor
        .intercept_cancellable(
            &descriptor(),
            &options,
            || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err::<(), _>(http_error(500)) }
            },
            &token,
        )
        .await
        .unwrap_err();
    canceller.await.unwrap();

    assert_eq!(err, ApiError::Cancelled);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert!(f.reporter.errors().is_empty());
    assert!(f.notifier.notices().is_empty());
    assert_eq!(f.reporter.timings()[0].outcome, RequestOutcome::Cancelled);
    assert_eq!(f.interceptor.active_request_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn concurrent_calls_get_distinct_correlation_ids() {
    let f = fixture();
    let seen = Mutex::new(Vec::new());
    let descriptor = descriptor();
    let options = fast_options(0);

    let (f_ref, seen_ref, descriptor_ref, options_ref) = (&f, &seen, &descriptor, &options);
    let call = move || {
        f_ref.interceptor.intercept(descriptor_ref, options_ref, move || {
            seen_ref.lock().push(f_ref.interceptor.active_requests());
            async {
                tokio::time::sleep(Duration::from_millis(10)).await;
                Ok::<_, ApiError>(())
            }
        })
    };
    let (a, b) = tokio::join!(call(), call());
    a.unwrap();
    b.unwrap();

    let seen = seen.lock();
    assert_eq!(seen.len(), 2);
    assert_eq!(seen[1].len(), 2);
    assert_ne!(seen[1][0], seen[1][1]);
    assert_eq!(f.interceptor.active_request_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn active_set_is_empty_after_failure() {
    let f = fixture();

    let _ = f
        .interceptor
        .intercept(&descriptor(), &fast_options(2), || async { Err::<(), _>(http_error(502)) })
        .await;

    assert!(f.interceptor.active_requests().is_empty());
}
