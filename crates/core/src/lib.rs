//! # ClinicFlow Core
//!
//! Request pipeline for the ClinicFlow API - no HTTP client, no I/O.
//!
//! This crate contains:
//! - The transport contract and collaborator ports (traits)
//! - The request interceptor (correlation, retry, error handling)
//! - The response cache with structured keys
//! - The entity façade, health check and batch orchestrator
//!
//! ## Architecture Principles
//! - Depends on `clinicflow-common` and `clinicflow-domain` only
//! - All external effects go through ports implemented in `clinicflow-infra`
//! - Every component is testable with the in-memory doubles in [`testing`]

pub mod api;
pub mod batch;
pub mod cache;
pub mod entities;
pub mod interceptor;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use api::{
    ApiError, ApiErrorCategory, CredentialStore, ErrorReporter, ErrorTags, HttpMethod,
    NoticeLevel, Notifier, RequestOutcome, RequestTiming, SessionHandler, Transport,
    TransportError, TransportErrorCode, TransportRequest, TransportResponse, UserNotice,
};
pub use batch::{BatchOrchestrator, BatchResult, BatchSummary};
pub use cache::{CacheKey, CacheOperation, ResponseCache};
pub use entities::EntityService;
pub use interceptor::{RequestDescriptor, RequestInterceptor};
