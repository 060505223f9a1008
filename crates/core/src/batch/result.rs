//! Per-operation batch outcomes and their summary

use clinicflow_domain::BatchOperation;
use serde::ser::{Serialize, SerializeStruct, Serializer};
use serde_json::Value;
use tracing::{info, warn};

use crate::api::ApiError;

/// Outcome of one batch slot
///
/// Exactly one of `data()` / `error()` is present.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchResult {
    pub operation: BatchOperation,
    pub outcome: Result<Value, ApiError>,
}

impl BatchResult {
    pub fn new(operation: BatchOperation, outcome: Result<Value, ApiError>) -> Self {
        Self { operation, outcome }
    }

    pub fn success(&self) -> bool {
        self.outcome.is_ok()
    }

    pub fn data(&self) -> Option<&Value> {
        self.outcome.as_ref().ok()
    }

    pub fn error(&self) -> Option<&ApiError> {
        self.outcome.as_ref().err()
    }

    pub fn into_result(self) -> Result<Value, ApiError> {
        self.outcome
    }
}

/// `{ operation, success, data?, error? }` with the error rendered as text
impl Serialize for BatchResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("BatchResult", 3)?;
        state.serialize_field("operation", &self.operation)?;
        state.serialize_field("success", &self.success())?;
        match &self.outcome {
            Ok(data) => state.serialize_field("data", data)?,
            Err(err) => state.serialize_field("error", &err.to_string())?,
        }
        state.end()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// `(slot index, error message)` for every failed slot
    pub errors: Vec<(usize, String)>,
}

impl BatchSummary {
    pub fn from_results(results: &[BatchResult]) -> Self {
        let errors: Vec<(usize, String)> = results
            .iter()
            .enumerate()
            .filter_map(|(index, result)| result.error().map(|err| (index, err.to_string())))
            .collect();

        let summary = Self {
            total: results.len(),
            succeeded: results.len() - errors.len(),
            failed: errors.len(),
            errors,
        };

        if summary.all_succeeded() {
            info!(total = summary.total, "Batch completed");
        } else {
            warn!(
                total = summary.total,
                failed = summary.failed,
                "Batch completed with failures"
            );
        }
        summary
    }

    pub fn all_succeeded(&self) -> bool {
        self.failed == 0
    }
}
