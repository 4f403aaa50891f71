use chrono::{DateTime, Utc};
use classroom_core::Validator;
use serde::Serialize;

/// Sort keys accepted by the classroom list endpoint.
pub const CLASSROOM_SORT_SAFELIST: &[&str] =
    &["id", "name", "created_at", "-id", "-name", "-created_at"];

/// Maximum classroom name length in bytes.
pub const CLASSROOM_NAME_MAX_BYTES: usize = 50;

/// Maximum classroom description length in bytes.
pub const CLASSROOM_DESCRIPTION_MAX_BYTES: usize = 1000;

/// Persisted classroom.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Classroom {
    /// Database id.
    pub id: i64,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Display name.
    pub name: String,
    /// Free-form description.
    pub description: String,
}

/// Classroom fields supplied on create.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassroomDraft {
    /// Display name.
    pub name: String,
    /// Free-form description.
    pub description: String,
}

/// Records classroom field failures.
pub fn validate_classroom(validator: &mut Validator, name: &str, description: &str) {
    validator.check(!name.is_empty(), "name", "must be provided");
    validator.check(
        name.len() <= CLASSROOM_NAME_MAX_BYTES,
        "name",
        "must be no more than 50 bytes long",
    );
    validator.check(
        description.len() <= CLASSROOM_DESCRIPTION_MAX_BYTES,
        "description",
        "must be no more than 1000 bytes long",
    );
}
