mod classrooms;
mod common;
mod tasks;
mod users;

pub use classrooms::{
    ClassroomListResponse, ClassroomResponse, CreateClassroomRequest, UpdateClassroomRequest,
};
pub use common::{DeleteResponse, HealthResponse, ListParams};
pub use tasks::{CreateTaskRequest, TaskListResponse, TaskResponse, UpdateTaskRequest};
pub use users::{
    ActivateUserRequest, AuthenticationTokenResponse, LoginRequest, RegisterUserRequest,
    RegisteredUser, RegistrationResponse, UpdateUserRequest, UserResponse,
};
