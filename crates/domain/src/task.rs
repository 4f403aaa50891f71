use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use classroom_core::{AppError, Validator};
use serde::Serialize;

/// Sort keys accepted by the task list endpoint.
pub const TASK_SORT_SAFELIST: &[&str] = &[
    "id",
    "header",
    "created_at",
    "updated_at",
    "-id",
    "-header",
    "-created_at",
    "-updated_at",
];

/// Maximum task header length in bytes.
pub const TASK_HEADER_MAX_BYTES: usize = 50;

/// Maximum task description length in bytes.
pub const TASK_DESCRIPTION_MAX_BYTES: usize = 3000;

/// Persisted task together with the classrooms it is assigned to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Task {
    /// Database id.
    pub id: i64,
    /// Short title.
    pub header: String,
    /// Free-form description.
    pub description: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp, also the optimistic concurrency token.
    pub updated_at: DateTime<Utc>,
    /// Ids of the classrooms the task is assigned to, ascending.
    #[serde(rename = "classrooms")]
    pub classroom_ids: Vec<i64>,
}

/// Task fields supplied on create.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDraft {
    /// Short title.
    pub header: String,
    /// Free-form description.
    pub description: String,
    /// Classrooms to assign the task to.
    pub classroom_ids: Vec<i64>,
}

/// Records task field failures.
pub fn validate_task(validator: &mut Validator, header: &str, description: &str) {
    validator.check(!header.is_empty(), "header", "must be provided");
    validator.check(
        header.len() <= TASK_HEADER_MAX_BYTES,
        "header",
        "must be no more than 50 bytes long",
    );
    validator.check(
        description.len() <= TASK_DESCRIPTION_MAX_BYTES,
        "description",
        "must be no more than 3000 bytes long",
    );
}

/// Records failures for the classroom assignment list.
pub fn validate_classroom_ids(validator: &mut Validator, classroom_ids: &[i64]) {
    validator.check(
        classroom_ids.iter().all(|id| *id > 0),
        "classrooms",
        "must contain only positive ids",
    );

    let unique: BTreeSet<&i64> = classroom_ids.iter().collect();
    validator.check(
        unique.len() == classroom_ids.len(),
        "classrooms",
        "must not contain duplicate values",
    );
}

/// Error for a classroom assignment naming a classroom that does not exist.
#[must_use]
pub fn unknown_classrooms_error() -> AppError {
    let mut validator = Validator::new();
    validator.add_error("classrooms", "must reference existing classrooms");
    AppError::InvalidFields(validator.into_errors())
}

#[cfg(test)]
mod tests {
    use classroom_core::Validator;

    use super::{validate_classroom_ids, validate_task};

    #[test]
    fn header_limits_apply() {
        let mut validator = Validator::new();
        validate_task(&mut validator, &"h".repeat(51), "");

        assert_eq!(
            validator.errors().get("header"),
            Some("must be no more than 50 bytes long")
        );
    }

    #[test]
    fn duplicate_classroom_ids_are_rejected() {
        let mut validator = Validator::new();
        validate_classroom_ids(&mut validator, &[1, 2, 1]);

        assert_eq!(
            validator.errors().get("classrooms"),
            Some("must not contain duplicate values")
        );
    }

    #[test]
    fn empty_assignment_list_is_valid() {
        let mut validator = Validator::new();
        validate_classroom_ids(&mut validator, &[]);

        assert!(validator.valid());
    }
}
