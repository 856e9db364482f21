//! Application-wide error types.

use thiserror::Error;

/// Result type alias using `AppError`.
pub type AppResult<T> = Result<T, AppError>;

/// Application error types.
///
/// Domain errors from the wallet core are folded into these variants at the
/// application edge so callers have one taxonomy to present.
#[derive(Debug, Error)]
pub enum AppError {
    /// The acting principal lacks the required capability.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Resource not found, or no longer in a state the operation accepts.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Validation error.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

impl AppError {
    /// Returns the error code presented to callers.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Unauthorized(_) => "UNAUTHORIZED",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }

    /// Returns the process exit code used by command-line front ends.
    ///
    /// Values follow `sysexits.h`.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Validation(_) => 65,
            Self::NotFound(_) => 66,
            Self::Database(_) => 75,
            Self::Unauthorized(_) => 77,
        }
    }

    /// Returns true if repeating the whole operation may succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Database(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(AppError::Unauthorized(String::new()), "UNAUTHORIZED", 77)]
    #[case(AppError::NotFound(String::new()), "NOT_FOUND", 66)]
    #[case(AppError::Validation(String::new()), "VALIDATION_ERROR", 65)]
    #[case(AppError::Database(String::new()), "DATABASE_ERROR", 75)]
    fn test_error_codes(#[case] err: AppError, #[case] code: &str, #[case] exit: i32) {
        assert_eq!(err.error_code(), code);
        assert_eq!(err.exit_code(), exit);
    }

    #[test]
    fn test_only_database_errors_are_retryable() {
        assert!(AppError::Database("timeout".into()).is_retryable());
        assert!(!AppError::Unauthorized("x".into()).is_retryable());
        assert!(!AppError::NotFound("x".into()).is_retryable());
        assert!(!AppError::Validation("x".into()).is_retryable());
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            AppError::Unauthorized("msg".into()).to_string(),
            "Unauthorized: msg"
        );
        assert_eq!(
            AppError::NotFound("msg".into()).to_string(),
            "Not found: msg"
        );
        assert_eq!(
            AppError::Validation("msg".into()).to_string(),
            "Validation error: msg"
        );
        assert_eq!(
            AppError::Database("msg".into()).to_string(),
            "Database error: msg"
        );
    }
}
