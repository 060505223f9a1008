//! Common utility functions and helper macros
//!
//! - **[`macros`]**: `impl_str_conversions!` for fieldless enums
//! - **[`serde`]**: millisecond encodings for `Duration`

#[macro_use]
pub mod macros;
pub mod serde;

pub use self::serde::{duration_millis, option_duration_millis};
