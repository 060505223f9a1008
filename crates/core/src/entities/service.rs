//! Entity façade - uniform CRUD over the clinical endpoints

use std::sync::Arc;
use std::time::Duration;

use clinicflow_domain::constants::DEFAULT_HEALTH_TIMEOUT_MS;
use clinicflow_domain::{ApiEnvelope, EntityType, HealthReport, Page, Record, RequestOptions};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, instrument};

use super::health;
use crate::api::{ApiError, HttpMethod, Transport, TransportError, TransportRequest};
use crate::cache::{CacheKey, CacheOperation, ResponseCache};
use crate::interceptor::{RequestDescriptor, RequestInterceptor};

const REJECTED_FALLBACK_MESSAGE: &str = "Request failed";

/// CRUD façade over the backend's entity endpoints
///
/// Every call goes through the [`RequestInterceptor`]. Reads are served
/// from the owned [`ResponseCache`] when `use_cache` allows it; writes
/// invalidate the affected entity's entries after they succeed.
pub struct EntityService {
    transport: Arc<dyn Transport>,
    interceptor: Arc<RequestInterceptor>,
    cache: ResponseCache,
    health_timeout: Duration,
}

impl EntityService {
    /// Service with a default interceptor (no side effects) and cache
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            interceptor: Arc::new(RequestInterceptor::default()),
            cache: ResponseCache::default(),
            health_timeout: Duration::from_millis(DEFAULT_HEALTH_TIMEOUT_MS),
        }
    }

    pub fn with_interceptor(mut self, interceptor: Arc<RequestInterceptor>) -> Self {
        self.interceptor = interceptor;
        self
    }

    pub fn with_cache(mut self, cache: ResponseCache) -> Self {
        self.cache = cache;
        self
    }

    pub fn with_health_timeout(mut self, timeout: Duration) -> Self {
        self.health_timeout = timeout;
        self
    }

    pub fn interceptor(&self) -> &Arc<RequestInterceptor> {
        &self.interceptor
    }

    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    /// List all records of `entity`; missing `data` yields an empty list
    #[instrument(skip_all, fields(entity = %entity))]
    pub async fn list<T>(
        &self,
        entity: &EntityType,
        options: &RequestOptions,
    ) -> Result<Vec<T>, ApiError>
    where
        T: DeserializeOwned,
    {
        let key = CacheKey::list(entity, options);
        if let Some(hit) = self.cached(&key, options) {
            return decode(hit);
        }

        let request = with_query_params(TransportRequest::get(entity.endpoint()), options);
        let envelope = self.send(request, options).await?;
        let data = envelope.data.unwrap_or_else(|| Value::Array(Vec::new()));

        self.store(key, &data, entity, options);
        decode(data)
    }

    /// One page of `entity` together with the server's paging metadata
    #[instrument(skip_all, fields(entity = %entity))]
    pub async fn list_page<T>(
        &self,
        entity: &EntityType,
        options: &RequestOptions,
    ) -> Result<Page<T>, ApiError>
    where
        T: DeserializeOwned,
    {
        let key = CacheKey::page(entity, options);
        if let Some(hit) = self.cached(&key, options) {
            return decode(hit);
        }

        let request = with_query_params(TransportRequest::get(entity.endpoint()), options);
        let envelope = self.send(request, options).await?;
        let page = json!({
            "items": envelope.data.unwrap_or_else(|| Value::Array(Vec::new())),
            "pagination": envelope.pagination,
        });

        self.store(key, &page, entity, options);
        decode(page)
    }

    /// Fetch one record; missing `data` decodes from `null`
    #[instrument(skip_all, fields(entity = %entity, id = %id))]
    pub async fn get<T>(
        &self,
        entity: &EntityType,
        id: &str,
        options: &RequestOptions,
    ) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
    {
        let key = CacheKey::get(entity, id);
        if let Some(hit) = self.cached(&key, options) {
            return decode(hit);
        }

        let envelope = self.send(TransportRequest::get(entity.item_path(id)), options).await?;
        let data = envelope.data.unwrap_or(Value::Null);

        self.store(key, &data, entity, options);
        decode(data)
    }

    /// Create a record, then drop every cached list of `entity`
    #[instrument(skip_all, fields(entity = %entity))]
    pub async fn create<T, B>(
        &self,
        entity: &EntityType,
        data: &B,
        options: &RequestOptions,
    ) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let request = TransportRequest::post(entity.endpoint(), encode(data)?);
        let envelope = self.send(request, options).await?;

        self.cache.invalidate_scope(CacheOperation::List, entity, None);
        decode(envelope.data.unwrap_or(Value::Null))
    }

    /// Replace a record, then drop cached lists of `entity` and its cached `get`
    #[instrument(skip_all, fields(entity = %entity, id = %id))]
    pub async fn update<T, B>(
        &self,
        entity: &EntityType,
        id: &str,
        data: &B,
        options: &RequestOptions,
    ) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let request = TransportRequest::put(entity.item_path(id), encode(data)?);
        let envelope = self.send(request, options).await?;

        self.invalidate_record(entity, id);
        decode(envelope.data.unwrap_or(Value::Null))
    }

    #[instrument(skip_all, fields(entity = %entity, id = %id))]
    pub async fn delete(
        &self,
        entity: &EntityType,
        id: &str,
        options: &RequestOptions,
    ) -> Result<Value, ApiError> {
        let envelope = self.send(TransportRequest::delete(entity.item_path(id)), options).await?;

        self.invalidate_record(entity, id);
        Ok(envelope.data.unwrap_or(Value::Null))
    }

    pub async fn list_records<R: Record>(
        &self,
        options: &RequestOptions,
    ) -> Result<Vec<R>, ApiError> {
        self.list(&R::ENTITY_TYPE, options).await
    }

    pub async fn get_record<R: Record>(
        &self,
        id: &str,
        options: &RequestOptions,
    ) -> Result<R, ApiError> {
        self.get(&R::ENTITY_TYPE, id, options).await
    }

    pub async fn create_record<R: Record>(
        &self,
        record: &R,
        options: &RequestOptions,
    ) -> Result<R, ApiError> {
        self.create(&R::ENTITY_TYPE, record, options).await
    }

    /// Update `record` in place on the server; it must carry an id
    pub async fn update_record<R: Record>(
        &self,
        record: &R,
        options: &RequestOptions,
    ) -> Result<R, ApiError> {
        let id = record.id().ok_or_else(|| {
            ApiError::InvalidOperation(format!("{} record has no id", R::ENTITY_TYPE))
        })?;
        self.update(&R::ENTITY_TYPE, id, record, options).await
    }

    /// Drop every cached response
    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    /// Drop cached responses whose key contains `pattern`
    pub fn invalidate_cache(&self, pattern: &str) -> usize {
        self.cache.invalidate(pattern)
    }

    /// Call `/health` directly on the transport, bypassing cache and retry
    pub async fn health_check(&self) -> HealthReport {
        health::check(self.transport.as_ref(), self.health_timeout).await
    }

    fn cached(&self, key: &CacheKey, options: &RequestOptions) -> Option<Value> {
        if !options.cache_enabled() {
            return None;
        }
        self.cache.get(key)
    }

    fn store(&self, key: CacheKey, value: &Value, entity: &EntityType, options: &RequestOptions) {
        if options.cache_enabled() {
            self.cache.set(key, value.clone(), options.ttl_for(entity));
        }
    }

    fn invalidate_record(&self, entity: &EntityType, id: &str) {
        self.cache.invalidate_scope(CacheOperation::List, entity, None);
        self.cache.invalidate_scope(CacheOperation::Get, entity, Some(id));
    }

    /// One intercepted exchange; each attempt re-sends the same request
    async fn send(
        &self,
        request: TransportRequest,
        options: &RequestOptions,
    ) -> Result<ApiEnvelope<Value>, ApiError> {
        let descriptor = RequestDescriptor::new(request.method, request.path.clone());

        self.interceptor
            .intercept(&descriptor, options, || {
                attempt(Arc::clone(&self.transport), request.clone())
            })
            .await
    }
}

async fn attempt(
    transport: Arc<dyn Transport>,
    request: TransportRequest,
) -> Result<ApiEnvelope<Value>, ApiError> {
    let method = request.method;
    let path = request.path.clone();

    let response = transport.execute(request).await?;
    if !response.is_success() {
        return Err(TransportError::http(method, path, response.status, Some(response.body)).into());
    }
    unwrap_envelope(method, response.body)
}

/// A 2xx write with no body (204 No Content) succeeds without data; an
/// empty read is a decode failure.
fn unwrap_envelope(method: HttpMethod, body: Value) -> Result<ApiEnvelope<Value>, ApiError> {
    if body.is_null() {
        if method == HttpMethod::Get {
            return Err(ApiError::Decode(format!("empty response body for {method}")));
        }
        return Ok(ApiEnvelope::empty());
    }

    let envelope: ApiEnvelope<Value> =
        serde_json::from_value(body).map_err(|err| ApiError::Decode(err.to_string()))?;
    if !envelope.success {
        let message =
            envelope.message.unwrap_or_else(|| REJECTED_FALLBACK_MESSAGE.to_string());
        debug!(%method, message = %message, "Server rejected request");
        return Err(ApiError::Rejected { message });
    }
    Ok(envelope)
}

fn with_query_params(mut request: TransportRequest, options: &RequestOptions) -> TransportRequest {
    for (name, value) in &options.extra {
        let value = match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        request = request.with_query(name.clone(), value);
    }
    request
}

fn encode<B: Serialize + ?Sized>(data: &B) -> Result<Value, ApiError> {
    serde_json::to_value(data)
        .map_err(|err| ApiError::InvalidOperation(format!("request body is not valid JSON: {err}")))
}

fn decode<T: DeserializeOwned>(value: Value) -> Result<T, ApiError> {
    serde_json::from_value(value).map_err(|err| ApiError::Decode(err.to_string()))
}
