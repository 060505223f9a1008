//! # ClinicFlow Infrastructure
//!
//! Infrastructure implementations of the core ports.
//!
//! This crate contains:
//! - The reqwest-backed HTTP transport
//! - Credential stores and the 401 session handler
//! - Tracing-backed error reporting and user notices
//! - Configuration loading
//! - [`ClinicApiClient`], which assembles all of the above
//!
//! ## Architecture
//! - Implements traits defined in `clinicflow-core`
//! - Contains all "impure" code (network, filesystem, environment)

pub mod auth;
pub mod client;
pub mod config;
pub mod errors;
pub mod http;
pub mod observability;

// Re-export commonly used items
pub use auth::{CredentialSession, FileCredentialStore, MemoryCredentialStore, SessionEvent};
pub use client::ClinicApiClient;
pub use http::{HttpTransport, HttpTransportBuilder};
pub use observability::{init_tracing, ChannelNotifier, TracingNotifier, TracingReporter};
