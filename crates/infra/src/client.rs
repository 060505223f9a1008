//! Assembled API client
//!
//! Wires the reqwest transport, credential session, reporter, notifier and
//! cache into one [`EntityService`].

use std::sync::Arc;

use clinicflow_common::CacheConfig;
use clinicflow_core::{
    BatchOrchestrator, CredentialStore, EntityService, RequestInterceptor, ResponseCache,
    UserNotice,
};
use clinicflow_domain::{ClientConfig, HealthReport, RequestOptions, Result};
use parking_lot::Mutex;
use tokio::sync::{mpsc, watch};
use tracing::info;

use crate::auth::{CredentialSession, SessionEvent};
use crate::http::HttpTransport;
use crate::observability::{ChannelNotifier, TracingReporter, DEFAULT_NOTICE_CAPACITY};

pub struct ClinicApiClient {
    config: ClientConfig,
    transport: Arc<HttpTransport>,
    session: Arc<CredentialSession>,
    service: Arc<EntityService>,
    notices: Mutex<Option<mpsc::Receiver<UserNotice>>>,
}

impl ClinicApiClient {
    /// Build the client from validated configuration.
    ///
    /// The bearer token, if any, is loaded from `credentials`.
    ///
    /// # Errors
    /// Returns `ClinicError::Config` for invalid configuration and propagates
    /// credential store failures.
    pub fn from_config(
        config: ClientConfig,
        credentials: Arc<dyn CredentialStore>,
    ) -> Result<Self> {
        config.validate()?;

        let transport = Arc::new(
            HttpTransport::builder()
                .base_url(&config.api.base_url)
                .timeout(config.api.timeout)
                .user_agent(&config.api.user_agent)
                .credential_store(credentials)
                .build()?,
        );
        let session =
            Arc::new(CredentialSession::new(Arc::clone(&transport), &config.api.login_path));
        let (notifier, notices) = ChannelNotifier::channel(DEFAULT_NOTICE_CAPACITY);

        let interceptor = Arc::new(RequestInterceptor::new(
            session.clone(),
            Arc::new(notifier),
            Arc::new(TracingReporter::new()),
        ));

        let mut cache_config = CacheConfig::builder().default_ttl(config.cache.default_ttl);
        if let Some(max) = config.cache.max_entries {
            cache_config = cache_config.max_entries(max);
        }

        let service = EntityService::new(transport.clone())
            .with_interceptor(interceptor)
            .with_cache(ResponseCache::new(cache_config.build()))
            .with_health_timeout(config.api.health_timeout);

        info!(base_url = %transport.base_url(), "API client ready");

        Ok(Self {
            config,
            transport,
            session,
            service: Arc::new(service),
            notices: Mutex::new(Some(notices)),
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn service(&self) -> &Arc<EntityService> {
        &self.service
    }

    pub fn batch(&self) -> BatchOrchestrator {
        BatchOrchestrator::new(Arc::clone(&self.service))
    }

    pub async fn health_check(&self) -> HealthReport {
        self.service.health_check().await
    }

    /// Options carrying the configured retry defaults
    pub fn default_options(&self) -> RequestOptions {
        self.config.default_request_options()
    }

    pub fn session_events(&self) -> watch::Receiver<SessionEvent> {
        self.session.subscribe()
    }

    /// Store a token after a successful login
    pub fn set_auth_token(&self, token: impl Into<String>) -> Result<()> {
        self.session.login(token)
    }

    pub fn is_authenticated(&self) -> bool {
        self.transport.has_auth_token()
    }

    /// Receiver for user notices. Returns `None` once taken.
    pub fn take_notices(&self) -> Option<mpsc::Receiver<UserNotice>> {
        self.notices.lock().take()
    }
}

#[cfg(test)]
mod tests {
    use clinicflow_domain::ClinicError;

    use super::*;
    use crate::auth::MemoryCredentialStore;

    #[test]
    fn rejects_invalid_config() {
        let mut config = ClientConfig::default();
        config.api.base_url = "nope".into();

        let result = ClinicApiClient::from_config(config, Arc::new(MemoryCredentialStore::default()));
        assert!(matches!(result, Err(ClinicError::Config(_))));
    }

    #[test]
    fn notices_can_be_taken_once() {
        let client = ClinicApiClient::from_config(
            ClientConfig::default(),
            Arc::new(MemoryCredentialStore::with_token("t")),
        )
        .unwrap();

        assert!(client.is_authenticated());
        assert!(client.take_notices().is_some());
        assert!(client.take_notices().is_none());
    }
}
