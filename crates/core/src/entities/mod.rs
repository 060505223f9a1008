//! Entity façade and health check

pub mod health;
pub mod service;

pub use service::EntityService;
