//! Shared primitives for all Rust crates in the classroom service.

#![forbid(unsafe_code)]

/// Caller identity primitives shared across services.
pub mod auth;
/// Field-level validation accumulator.
pub mod validator;

use thiserror::Error;

pub use auth::{AuthenticatedUser, Identity};
pub use validator::{FieldErrors, Validator};

/// Result type used across classroom crates.
pub type AppResult<T> = Result<T, AppError>;

/// Common application error categories.
#[derive(Debug, Error)]
pub enum AppError {
    /// Malformed request that cannot be attributed to a single field.
    #[error("validation error: {0}")]
    Validation(String),

    /// One or more request fields failed validation.
    #[error("invalid fields: {0}")]
    InvalidFields(FieldErrors),

    /// Requested resource does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Write operation conflicts with existing state.
    #[error("conflict: {0}")]
    Conflict(String),

    /// A unique constraint rejected the write.
    #[error("duplicate value for field '{field}'")]
    Duplicate {
        /// Request field backed by the violated constraint.
        field: String,
    },

    /// Caller is not authenticated or presented unusable credentials.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Caller is authenticated but blocked by authorization policy.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Internal unexpected error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns whether the error reports a missing record.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

#[cfg(test)]
mod tests {
    use super::{AppError, Validator};

    #[test]
    fn invalid_fields_display_lists_fields() {
        let mut validator = Validator::new();
        validator.add_error("email", "must be provided");

        let error = AppError::InvalidFields(validator.into_errors());
        assert_eq!(
            error.to_string(),
            "invalid fields: email: must be provided"
        );
    }

    #[test]
    fn duplicate_names_the_field() {
        let error = AppError::Duplicate {
            field: "email".to_owned(),
        };
        assert_eq!(error.to_string(), "duplicate value for field 'email'");
        assert!(!error.is_not_found());
    }
}
