//! Logging, error reporting and user notices
//!
//! - [`logging::init_tracing`] installs the `tracing` subscriber
//! - [`TracingReporter`] turns pipeline failures and timings into events
//! - [`TracingNotifier`] and [`ChannelNotifier`] deliver user notices

pub mod logging;
pub mod notifier;
pub mod reporter;

pub use logging::init_tracing;
pub use notifier::{ChannelNotifier, TracingNotifier, DEFAULT_NOTICE_CAPACITY};
pub use reporter::{TracingReporter, DEFAULT_SLOW_REQUEST_THRESHOLD};
