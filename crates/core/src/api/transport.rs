//! Transport request/response contract
//!
//! One [`TransportRequest`] is one HTTP exchange. Paths are relative to the
//! transport's base URL; bodies are JSON.

use std::collections::BTreeMap;
use std::time::Duration;

use clinicflow_common::impl_str_conversions;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl_str_conversions!(HttpMethod {
    Get => "GET",
    Post => "POST",
    Put => "PUT",
    Patch => "PATCH",
    Delete => "DELETE",
});

/// Error codes for failures that never produced an HTTP status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransportErrorCode {
    NetworkUnreachable,
    Timeout,
    ConnectionAborted,
}

impl_str_conversions!(TransportErrorCode {
    NetworkUnreachable => "ERR_NETWORK",
    Timeout => "ETIMEDOUT",
    ConnectionAborted => "ECONNABORTED",
});

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransportRequest {
    pub method: HttpMethod,
    pub path: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub query: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
    /// Overrides the transport's default timeout
    #[serde(skip)]
    pub timeout: Option<Duration>,
}

impl TransportRequest {
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: BTreeMap::new(),
            headers: BTreeMap::new(),
            body: None,
            timeout: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, path)
    }

    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self::new(HttpMethod::Post, path).with_body(body)
    }

    pub fn put(path: impl Into<String>, body: Value) -> Self {
        Self::new(HttpMethod::Put, path).with_body(body)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Delete, path)
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(name.into(), value.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransportResponse {
    pub status: u16,
    /// Parsed JSON body; `Null` for empty bodies
    pub body: Value,
}

impl TransportResponse {
    pub fn new(status: u16, body: Value) -> Self {
        Self { status, body }
    }

    /// 200 with the given body
    pub fn ok(body: Value) -> Self {
        Self::new(200, body)
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Failure of a single transport exchange
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{method} {url} failed: {message}")]
pub struct TransportError {
    pub status: Option<u16>,
    pub code: Option<TransportErrorCode>,
    pub message: String,
    pub url: String,
    pub method: HttpMethod,
    /// Parsed error body, when the server sent one
    pub payload: Option<Value>,
}

impl TransportError {
    /// Non-2xx response
    pub fn http(
        method: HttpMethod,
        url: impl Into<String>,
        status: u16,
        payload: Option<Value>,
    ) -> Self {
        let message = payload
            .as_ref()
            .and_then(|body| body.get("message"))
            .and_then(Value::as_str)
            .map_or_else(|| format!("HTTP {status}"), |msg| format!("HTTP {status}: {msg}"));

        Self { status: Some(status), code: None, message, url: url.into(), method, payload }
    }

    /// Failure without a response
    pub fn network(
        method: HttpMethod,
        url: impl Into<String>,
        code: TransportErrorCode,
        message: impl Into<String>,
    ) -> Self {
        Self {
            status: None,
            code: Some(code),
            message: message.into(),
            url: url.into(),
            method,
            payload: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn http_error_uses_server_message() {
        let err = TransportError::http(
            HttpMethod::Post,
            "/patients",
            422,
            Some(json!({ "message": "first_name is required" })),
        );

        assert_eq!(err.status, Some(422));
        assert_eq!(err.to_string(), "POST /patients failed: HTTP 422: first_name is required");
    }

    #[test]
    fn http_error_without_body() {
        let err = TransportError::http(HttpMethod::Get, "/patients", 503, None);
        assert_eq!(err.message, "HTTP 503");
    }

    #[test]
    fn request_builders() {
        let request = TransportRequest::put("/patients/p1", json!({ "a": 1 }))
            .with_header("X-Trace", "1")
            .with_query("page", "2");

        assert_eq!(request.method, HttpMethod::Put);
        assert_eq!(request.body, Some(json!({ "a": 1 })));
        assert_eq!(request.query.get("page").map(String::as_str), Some("2"));
        assert!(TransportResponse::new(204, Value::Null).is_success());
        assert!(!TransportResponse::new(301, Value::Null).is_success());
    }

    #[test]
    fn codes_render_like_wire_codes() {
        assert_eq!(TransportErrorCode::Timeout.to_string(), "ETIMEDOUT");
        assert_eq!("err_network".parse::<TransportErrorCode>().unwrap(), TransportErrorCode::NetworkUnreachable);
    }
}
