//! # ClinicFlow Domain
//!
//! Data model for the ClinicFlow API communication layer.
//!
//! This crate contains:
//! - Entity types and their REST endpoints
//! - Request options, response envelopes and batch descriptors
//! - Record types for the main clinical entities
//! - Client configuration structures
//! - Domain error types and Result definitions
//!
//! ## Architecture
//! - Depends only on `clinicflow-common` (foundation tier)
//! - No I/O, no async runtime
//! - Pure domain models and data structures

pub mod config;
pub mod constants;
pub mod errors;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
