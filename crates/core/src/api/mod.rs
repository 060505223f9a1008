//! Transport contract, API errors and collaborator ports

pub mod errors;
pub mod ports;
pub mod transport;

pub use errors::{ApiError, ApiErrorCategory, GENERIC_ERROR_MESSAGE};
pub use ports::{
    CredentialStore, ErrorReporter, ErrorTags, NoopNotifier, NoopReporter, NoopSession,
    NoticeLevel, Notifier, RequestOutcome, RequestTiming, SessionHandler, Transport, UserNotice,
};
pub use transport::{
    HttpMethod, TransportError, TransportErrorCode, TransportRequest, TransportResponse,
};
