use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use clinicflow_core::{
    CredentialStore, HttpMethod, Transport, TransportError, TransportRequest, TransportResponse,
};
use clinicflow_domain::constants::{
    DEFAULT_API_BASE_URL, DEFAULT_REQUEST_TIMEOUT_MS, DEFAULT_USER_AGENT,
};
use clinicflow_domain::{ApiConfig, ClinicError, Result};
use parking_lot::RwLock;
use reqwest::{Client as ReqwestClient, Method};
use serde_json::Value;
use tracing::debug;

use crate::auth::MemoryCredentialStore;
use crate::errors::transport_error;

/// [`Transport`] over reqwest.
///
/// Paths are appended to the base URL. The bearer token is read from the
/// credential store once at construction and kept in memory afterwards;
/// [`set_auth_token`](Self::set_auth_token) and
/// [`clear_auth_token`](Self::clear_auth_token) update both.
pub struct HttpTransport {
    client: ReqwestClient,
    base_url: String,
    token: RwLock<Option<String>>,
    credentials: Arc<dyn CredentialStore>,
}

impl HttpTransport {
    /// Start building a new HTTP transport.
    pub fn builder() -> HttpTransportBuilder {
        HttpTransportBuilder::default()
    }

    /// Transport configured from the `api` section, with an in-memory
    /// credential store.
    pub fn from_config(config: &ApiConfig) -> Result<Self> {
        Self::builder()
            .base_url(&config.base_url)
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Persist `token` and attach it to every following request
    pub fn set_auth_token(&self, token: impl Into<String>) -> Result<()> {
        let token = token.into();
        self.credentials.store(&token)?;
        *self.token.write() = Some(token);
        Ok(())
    }

    /// Forget the token in memory and in the credential store
    pub fn clear_auth_token(&self) -> Result<()> {
        *self.token.write() = None;
        self.credentials.clear()
    }

    pub fn has_auth_token(&self) -> bool {
        self.token.read().is_some()
    }

    fn url_for(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn execute(
        &self,
        request: TransportRequest,
    ) -> std::result::Result<TransportResponse, TransportError> {
        let method = request.method;
        let url = self.url_for(&request.path);

        let mut builder = self.client.request(reqwest_method(method), &url);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        let token = self.token.read().clone();
        if let Some(token) = token {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }
        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }

        debug!(%method, %url, "sending HTTP request");
        let response = builder.send().await.map_err(|err| transport_error(err, method, &url))?;
        let status = response.status().as_u16();
        let bytes = response.bytes().await.map_err(|err| transport_error(err, method, &url))?;
        debug!(%method, %url, status, "received HTTP response");

        let body = if matches!(status, 204 | 205) { Value::Null } else { parse_body(&bytes) };

        if !(200..300).contains(&status) {
            let payload = (!body.is_null()).then_some(body);
            return Err(TransportError::http(method, url, status, payload));
        }
        Ok(TransportResponse::new(status, body))
    }
}

/// Empty bodies become `Null`; non-JSON bodies are kept as a string
fn parse_body(bytes: &[u8]) -> Value {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Value::Null;
    }
    serde_json::from_slice(bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(bytes).into_owned()))
}

fn reqwest_method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Patch => Method::PATCH,
        HttpMethod::Delete => Method::DELETE,
    }
}

/// Builder for [`HttpTransport`].
pub struct HttpTransportBuilder {
    base_url: String,
    timeout: Duration,
    user_agent: String,
    credentials: Option<Arc<dyn CredentialStore>>,
    default_headers: Option<reqwest::header::HeaderMap>,
}

impl Default for HttpTransportBuilder {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_string(),
            timeout: Duration::from_millis(DEFAULT_REQUEST_TIMEOUT_MS),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            credentials: None,
            default_headers: None,
        }
    }
}

impl HttpTransportBuilder {
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Default per-request timeout; a request's own timeout wins
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = agent.into();
        self
    }

    /// Where the bearer token is loaded from and persisted to
    pub fn credential_store(mut self, store: Arc<dyn CredentialStore>) -> Self {
        self.credentials = Some(store);
        self
    }

    pub fn default_headers(mut self, headers: reqwest::header::HeaderMap) -> Self {
        self.default_headers = Some(headers);
        self
    }

    /// # Errors
    /// Returns `ClinicError::Config` for an invalid base URL or client
    /// settings, and propagates credential store failures.
    pub fn build(self) -> Result<HttpTransport> {
        let parsed = url::Url::parse(&self.base_url).map_err(|e| {
            ClinicError::Config(format!("Invalid base URL '{}': {}", self.base_url, e))
        })?;

        let mut builder = ReqwestClient::builder()
            .timeout(self.timeout)
            .user_agent(self.user_agent)
            .no_proxy();

        if let Some(headers) = self.default_headers {
            builder = builder.default_headers(headers);
        }

        let client = builder
            .build()
            .map_err(|err| ClinicError::Config(format!("Failed to build HTTP client: {err}")))?;

        let credentials =
            self.credentials.unwrap_or_else(|| Arc::new(MemoryCredentialStore::default()));
        let token = credentials.load()?;

        Ok(HttpTransport {
            client,
            base_url: parsed.as_str().trim_end_matches('/').to_string(),
            token: RwLock::new(token),
            credentials,
        })
    }
}
