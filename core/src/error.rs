//! # Error Handling
//!
//! Provides the unified `AppError` enum for faults raised by the patcher.
//!
//! A declaration that cannot be found, or one that already carries its marker,
//! is not an error: those are ordinary `MatchResult` values.

use derive_more::{Display, From};

/// The Global Error Enum.
///
/// We use `derive_more` for boilerplate.
/// Note: String errors default to `General`.
#[derive(Debug, Display, From)]
pub enum AppError {
    /// The requested declaration kind is not one the patcher understands.
    #[from(ignore)]
    #[display("Unsupported declaration kind: '{_0}'")]
    UnsupportedKind(String),

    /// The buffer handed to the patcher is not valid UTF-8.
    #[display("Decode Error: {_0}")]
    Decode(std::str::Utf8Error),

    /// The target cannot describe a declaration (e.g. empty name).
    #[from(ignore)]
    #[display("Invalid Target: {_0}")]
    InvalidTarget(String),

    /// Generic errors.
    #[display("General Error: {_0}")]
    General(String),
}

/// Manual implementation of the standard Error trait.
impl std::error::Error for AppError {}

/// Helper type alias for Result using AppError.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utf8_conversion() {
        let bytes = vec![0x66, 0xff, 0x6f];
        let utf8_err = std::str::from_utf8(&bytes).unwrap_err();
        let app_err: AppError = utf8_err.into();
        assert!(matches!(app_err, AppError::Decode(_)));
    }

    #[test]
    fn test_string_conversion() {
        // String defaults to General, never to the explicit variants
        let msg = String::from("something wrong");
        let app_err: AppError = msg.into();
        match app_err {
            AppError::General(s) => assert_eq!(s, "something wrong"),
            _ => panic!("String should convert to AppError::General"),
        }
    }

    #[test]
    fn test_unsupported_kind_display() {
        let app_err = AppError::UnsupportedKind("struct".into());
        assert_eq!(
            format!("{}", app_err),
            "Unsupported declaration kind: 'struct'"
        );
    }
}
