use chrono::{DateTime, Utc};
use clinicflow_common::impl_str_conversions;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

impl_str_conversions!(HealthStatus {
    Healthy => "healthy",
    Unhealthy => "unhealthy",
});

/// Best-effort result of probing `/health`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    pub status: HealthStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_time_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl HealthReport {
    pub fn healthy(response_time_ms: u64, timestamp: DateTime<Utc>) -> Self {
        Self {
            status: HealthStatus::Healthy,
            response_time_ms: Some(response_time_ms),
            error: None,
            timestamp,
        }
    }

    pub fn unhealthy(
        error: impl Into<String>,
        response_time_ms: Option<u64>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self { status: HealthStatus::Unhealthy, response_time_ms, error: Some(error.into()), timestamp }
    }

    pub fn is_healthy(&self) -> bool {
        self.status == HealthStatus::Healthy
    }
}
