//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod classroom;
mod pagination;
mod security;
mod task;
mod token;
mod user;

pub use classroom::{
    CLASSROOM_DESCRIPTION_MAX_BYTES, CLASSROOM_NAME_MAX_BYTES, CLASSROOM_SORT_SAFELIST, Classroom,
    ClassroomDraft, validate_classroom,
};
pub use pagination::{
    DEFAULT_PAGE, DEFAULT_PAGE_SIZE, Filters, MAX_PAGE, MAX_PAGE_SIZE, Metadata, Page,
    PageRequest, SortDirection, SortKey, validate_filters,
};
pub use security::{Permission, PermissionSet};
pub use task::{
    TASK_DESCRIPTION_MAX_BYTES, TASK_HEADER_MAX_BYTES, TASK_SORT_SAFELIST, Task, TaskDraft,
    unknown_classrooms_error, validate_classroom_ids, validate_task,
};
pub use token::{TOKEN_PLAINTEXT_LENGTH, Token, TokenScope, validate_token_plaintext};
pub use user::{
    EMAIL_MAX_BYTES, NAME_MAX_BYTES, PASSWORD_MAX_BYTES, PASSWORD_MIN_BYTES, User, UserId,
    is_valid_email, normalize_email, validate_email, validate_password_plaintext,
    validate_user_names,
};
