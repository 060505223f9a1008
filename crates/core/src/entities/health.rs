//! Backend health check

use std::time::Duration;

use chrono::Utc;
use clinicflow_domain::constants::HEALTH_PATH;
use clinicflow_domain::HealthReport;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::api::{Transport, TransportRequest};

/// `GET /health` with `timeout`; every failure folds into an unhealthy report
pub async fn check(transport: &dyn Transport, timeout: Duration) -> HealthReport {
    let started = Instant::now();
    let request = TransportRequest::get(HEALTH_PATH).with_timeout(timeout);

    let result = tokio::time::timeout(timeout, transport.execute(request)).await;
    let elapsed_ms = started.elapsed().as_millis() as u64;
    let now = Utc::now();

    let report = match result {
        Ok(Ok(response)) if response.is_success() => HealthReport::healthy(elapsed_ms, now),
        Ok(Ok(response)) => {
            HealthReport::unhealthy(format!("HTTP {}", response.status), Some(elapsed_ms), now)
        }
        Ok(Err(err)) => HealthReport::unhealthy(err.message, Some(elapsed_ms), now),
        Err(_) => HealthReport::unhealthy(
            format!("Health check timed out after {}ms", timeout.as_millis()),
            Some(elapsed_ms),
            now,
        ),
    };

    if report.is_healthy() {
        debug!(elapsed_ms, "Health check passed");
    } else {
        warn!(elapsed_ms, error = ?report.error, "Health check failed");
    }
    report
}
