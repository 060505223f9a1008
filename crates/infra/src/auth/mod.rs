//! Credential storage and the 401 session handler

pub mod credentials;
pub mod session;

pub use credentials::{FileCredentialStore, MemoryCredentialStore};
pub use session::{CredentialSession, SessionEvent};
