use classroom_application::{
    ClassroomService, PermissionService, TaskService, TokenService, UserService,
};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub classroom_service: ClassroomService,
    pub task_service: TaskService,
    pub user_service: UserService,
    pub token_service: TokenService,
    pub permission_service: PermissionService,
}
