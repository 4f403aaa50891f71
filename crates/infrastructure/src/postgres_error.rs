//! Translation of PostgreSQL error codes into application errors.

use classroom_core::AppError;
use classroom_domain::unknown_classrooms_error;

const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";

/// Maps a unique violation on `users_email_key` to `Duplicate { field: "email" }`.
pub(crate) fn duplicate_email_or_internal(error: sqlx::Error, operation: &str) -> AppError {
    if let sqlx::Error::Database(ref database_error) = error
        && database_error.code().as_deref() == Some(UNIQUE_VIOLATION)
        && database_error.constraint() == Some("users_email_key")
    {
        return AppError::Duplicate {
            field: "email".to_owned(),
        };
    }

    AppError::Internal(format!("failed to {operation}: {error}"))
}

/// Maps a foreign key violation on the classroom side of `classroom_tasks` to
/// a field error on `classrooms`.
pub(crate) fn unknown_classroom_or_internal(error: sqlx::Error, operation: &str) -> AppError {
    if let sqlx::Error::Database(ref database_error) = error
        && database_error.code().as_deref() == Some(FOREIGN_KEY_VIOLATION)
        && database_error.constraint() == Some("classroom_tasks_classroom_id_fkey")
    {
        return unknown_classrooms_error();
    }

    AppError::Internal(format!("failed to {operation}: {error}"))
}

/// Wraps any other driver error.
pub(crate) fn internal(error: sqlx::Error, operation: &str) -> AppError {
    AppError::Internal(format!("failed to {operation}: {error}"))
}
