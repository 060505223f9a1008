//! Concurrent execution of declarative batch operations

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use clinicflow_domain::{BatchOperation, BatchOperationKind, RequestOptions};
use futures::future::join_all;
use futures::FutureExt;
use serde_json::Value;
use tracing::{debug, instrument};

use super::result::BatchResult;
use crate::api::{ApiError, HttpMethod};
use crate::entities::EntityService;
use crate::interceptor::RequestDescriptor;

const BATCH_PATH: &str = "batch";

/// Runs a list of [`BatchOperation`]s against one [`EntityService`]
pub struct BatchOrchestrator {
    service: Arc<EntityService>,
}

impl BatchOrchestrator {
    pub fn new(service: Arc<EntityService>) -> Self {
        Self { service }
    }

    /// Start every operation, then wait for all of them.
    ///
    /// Results come back in input order. A failing or panicking operation
    /// only fails its own slot. The batch as a whole is intercepted once
    /// with retries disabled; each operation still retries per its own
    /// options (or `options` when it carries none).
    #[instrument(skip_all, fields(operations = operations.len()))]
    pub async fn execute(
        &self,
        operations: Vec<BatchOperation>,
        options: &RequestOptions,
    ) -> Result<Vec<BatchResult>, ApiError> {
        let descriptor = RequestDescriptor::new(HttpMethod::Post, BATCH_PATH);
        let batch_options = options.clone().with_retries(0);
        let operations = &operations;

        self.service
            .interceptor()
            .intercept(&descriptor, &batch_options, || self.run_all(operations, options))
            .await
    }

    async fn run_all(
        &self,
        operations: &[BatchOperation],
        options: &RequestOptions,
    ) -> Result<Vec<BatchResult>, ApiError> {
        let slots = join_all(
            operations
                .iter()
                .map(|operation| AssertUnwindSafe(self.run_one(operation, options)).catch_unwind()),
        )
        .await;

        Ok(operations
            .iter()
            .zip(slots)
            .map(|(operation, slot)| {
                let outcome = slot.unwrap_or_else(|panic| Err(panic_error(panic.as_ref())));
                BatchResult::new(operation.clone(), outcome)
            })
            .collect())
    }

    async fn run_one(
        &self,
        operation: &BatchOperation,
        batch_options: &RequestOptions,
    ) -> Result<Value, ApiError> {
        let options = operation.options.as_ref().unwrap_or(batch_options);
        let entity = &operation.entity_type;
        debug!(kind = %operation.kind, %entity, "Running batch operation");

        check_inputs(operation)?;
        let id = operation.id.as_deref().unwrap_or_default();
        let data = operation.data.as_ref().unwrap_or(&Value::Null);

        match &operation.kind {
            BatchOperationKind::List => {
                let items: Vec<Value> = self.service.list(entity, options).await?;
                Ok(Value::Array(items))
            }
            BatchOperationKind::Get => self.service.get(entity, id, options).await,
            BatchOperationKind::Create => self.service.create(entity, data, options).await,
            BatchOperationKind::Update => self.service.update(entity, id, data, options).await,
            BatchOperationKind::Delete => self.service.delete(entity, id, options).await,
            BatchOperationKind::Unknown(kind) => {
                Err(ApiError::InvalidOperation(format!("Unknown operation type: {kind}")))
            }
        }
    }
}

/// Rejects an operation missing the id or payload its kind needs.
fn check_inputs(operation: &BatchOperation) -> Result<(), ApiError> {
    let kind = &operation.kind;
    if kind.requires_id() && operation.id.is_none() {
        return Err(ApiError::InvalidOperation(format!("{kind} operation requires an id")));
    }
    if kind.requires_data() && operation.data.is_none() {
        return Err(ApiError::InvalidOperation(format!("{kind} operation requires data")));
    }
    Ok(())
}

fn panic_error(panic: &(dyn Any + Send)) -> ApiError {
    let message = panic
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string());
    ApiError::InvalidOperation(format!("operation panicked: {message}"))
}
