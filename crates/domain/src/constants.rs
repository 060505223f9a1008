//! Application constants
//!
//! Centralized location for the defaults shared by options, configuration
//! and the request pipeline.

// Request defaults
pub const DEFAULT_RETRIES: u32 = 3;
pub const DEFAULT_RETRY_DELAY_MS: u64 = 1_000;
pub const DEFAULT_CACHE_TTL_MS: u64 = 300_000;
pub const TEMPLATE_CACHE_TTL_MS: u64 = 1_800_000;

// Transport
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:3000/api";
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 30_000;
pub const DEFAULT_USER_AGENT: &str = concat!("clinicflow/", env!("CARGO_PKG_VERSION"));

// Health check
pub const HEALTH_PATH: &str = "/health";
pub const DEFAULT_HEALTH_TIMEOUT_MS: u64 = 5_000;

// Session
pub const DEFAULT_LOGIN_PATH: &str = "/login";

// Correlation ids look like `req_<uuid v7 simple>`
pub const CORRELATION_ID_PREFIX: &str = "req_";

// Logging
pub const DEFAULT_LOG_LEVEL: &str = "info";
