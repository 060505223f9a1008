//! Data types exchanged between callers, the request pipeline and the backend

pub mod batch;
pub mod entity;
pub mod envelope;
pub mod error_context;
pub mod health;
pub mod options;
pub mod records;

pub use batch::{BatchOperation, BatchOperationKind};
pub use entity::{EntityRow, EntityType};
pub use envelope::{ApiEnvelope, Page, Pagination};
pub use error_context::ApiErrorContext;
pub use health::{HealthReport, HealthStatus};
pub use options::RequestOptions;
pub use records::{Appointment, AppointmentStatus, Patient, Prescription, Record};
