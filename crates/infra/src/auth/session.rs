use std::sync::Arc;

use clinicflow_core::SessionHandler;
use clinicflow_domain::Result;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{info, warn};

use crate::http::HttpTransport;

/// Session state published to the UI layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    Active,
    LoginRequired { login_path: String },
}

/// [`SessionHandler`] that drops the transport's bearer token and asks the
/// UI to navigate to the login page.
///
/// Navigation is published on a `watch` channel; subscribers always see the
/// latest state.
pub struct CredentialSession {
    transport: Arc<HttpTransport>,
    login_path: String,
    events: watch::Sender<SessionEvent>,
}

impl CredentialSession {
    pub fn new(transport: Arc<HttpTransport>, login_path: impl Into<String>) -> Self {
        let (events, _) = watch::channel(SessionEvent::Active);
        Self { transport, login_path: login_path.into(), events }
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    pub fn current(&self) -> SessionEvent {
        self.events.borrow().clone()
    }

    /// Store a fresh token and mark the session active again
    pub fn login(&self, token: impl Into<String>) -> Result<()> {
        self.transport.set_auth_token(token)?;
        self.events.send_replace(SessionEvent::Active);
        info!("session authenticated");
        Ok(())
    }
}

impl SessionHandler for CredentialSession {
    fn clear_credentials(&self) {
        if let Err(err) = self.transport.clear_auth_token() {
            warn!(error = %err, "failed to clear stored credentials");
        }
    }

    fn redirect_to_login(&self) {
        info!(login_path = %self.login_path, "login required");
        self.events.send_replace(SessionEvent::LoginRequired { login_path: self.login_path.clone() });
    }
}

#[cfg(test)]
mod tests {
    use crate::auth::MemoryCredentialStore;

    use super::*;

    fn session_with_token() -> (CredentialSession, Arc<HttpTransport>) {
        let transport = Arc::new(
            HttpTransport::builder()
                .credential_store(Arc::new(MemoryCredentialStore::with_token("t0")))
                .build()
                .unwrap(),
        );
        (CredentialSession::new(Arc::clone(&transport), "/login"), transport)
    }

    #[test]
    fn unauthorized_flow_clears_token_and_publishes_redirect() {
        let (session, transport) = session_with_token();
        let events = session.subscribe();

        session.clear_credentials();
        session.redirect_to_login();

        assert!(!transport.has_auth_token());
        assert_eq!(
            *events.borrow(),
            SessionEvent::LoginRequired { login_path: "/login".to_string() }
        );
    }

    #[test]
    fn login_restores_active_state() {
        let (session, transport) = session_with_token();
        session.redirect_to_login();

        session.login("t1").unwrap();

        assert!(transport.has_auth_token());
        assert_eq!(session.current(), SessionEvent::Active);
    }
}
