//! Request interceptor: correlation, timing, retry and failure handling

pub mod correlation;
pub mod policy;
pub mod service;

pub use correlation::{new_correlation_id, ActiveRequestGuard, ActiveRequests};
pub use policy::HttpRetryPolicy;
pub use service::{RequestDescriptor, RequestInterceptor};
