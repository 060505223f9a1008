//! Batch operations
//!
//! Runs many façade calls concurrently and reports one result per call.

pub mod orchestrator;
pub mod result;

pub use orchestrator::BatchOrchestrator;
pub use result::{BatchResult, BatchSummary};
