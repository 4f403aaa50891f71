//! Application services and ports.

#![forbid(unsafe_code)]

mod classroom_service;
mod permission_service;
mod task_service;
mod token_service;
mod user_service;

pub use classroom_service::{ClassroomPatch, ClassroomRepository, ClassroomService};
pub use permission_service::{MISSING_PERMISSION, PermissionRepository, PermissionService};
pub use task_service::{EDIT_CONFLICT, TaskPatch, TaskRepository, TaskService, TaskUpdate};
pub use token_service::{INVALID_AUTHENTICATION_TOKEN, TokenRepository, TokenService};
pub use user_service::{
    DUPLICATE_EMAIL, FOREIGN_ACCOUNT, INVALID_CREDENTIALS, NewUser, PasswordCredential,
    PasswordHasher, RegisterUser, Registration, TokenLifetimes, UpdateUser, UserRecord,
    UserRepository, UserService,
};
