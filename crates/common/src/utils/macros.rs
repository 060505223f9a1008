//! Macros for reducing boilerplate code

use thiserror::Error;

/// Error returned by `FromStr` impls generated with
/// [`impl_str_conversions!`](crate::impl_str_conversions).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid {kind}: {value}")]
pub struct ParseEnumError {
    /// Name of the enum that failed to parse
    pub kind: &'static str,
    /// Rejected input
    pub value: String,
}

/// Implements `as_str`, `Display` and `FromStr` for fieldless enums
///
/// Parsing is ASCII case-insensitive; display always uses the canonical
/// spelling given in the mapping.
///
/// # Example
///
/// ```rust
/// use std::str::FromStr;
///
/// use clinicflow_common::impl_str_conversions;
///
/// #[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// pub enum Verb {
///     Get,
///     Post,
/// }
///
/// impl_str_conversions!(Verb {
///     Get => "GET",
///     Post => "POST",
/// });
///
/// assert_eq!(Verb::Get.to_string(), "GET");
/// assert_eq!(Verb::from_str("post").unwrap(), Verb::Post);
/// ```
#[macro_export]
macro_rules! impl_str_conversions {
    ($enum_name:ident { $($variant:ident => $str:expr),+ $(,)? }) => {
        impl $enum_name {
            /// Canonical string form
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $str,)+
                }
            }
        }

        impl ::std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl ::std::str::FromStr for $enum_name {
            type Err = $crate::utils::macros::ParseEnumError;

            fn from_str(s: &str) -> ::core::result::Result<Self, Self::Err> {
                $(
                    if s.eq_ignore_ascii_case($str) {
                        return ::core::result::Result::Ok(Self::$variant);
                    }
                )+
                ::core::result::Result::Err($crate::utils::macros::ParseEnumError {
                    kind: stringify!($enum_name),
                    value: s.to_string(),
                })
            }
        }
    };
}
