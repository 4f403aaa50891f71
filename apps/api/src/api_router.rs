use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::middleware::from_fn_with_state;
use axum::routing::{get, post, put};
use tower_http::trace::TraceLayer;

use crate::handlers::{classrooms, fallback, health, tasks, users};
use crate::middleware;
use crate::state::AppState;


/// Largest accepted request body.
const MAX_BODY_BYTES: usize = 1_048_576;

pub fn build_router(app_state: AppState) -> Router {
    let api_routes = Router::new()
        .route(
            "/class",
            get(classrooms::list_classrooms_handler).post(classrooms::create_classroom_handler),
        )
        .route(
            "/class/{id}",
            get(classrooms::get_classroom_handler)
                .put(classrooms::update_classroom_handler)
                .delete(classrooms::delete_classroom_handler),
        )
        .route(
            "/task",
            get(tasks::list_tasks_handler).post(tasks::create_task_handler),
        )
        .route(
            "/task/{id}",
            get(tasks::get_task_handler)
                .put(tasks::update_task_handler)
                .delete(tasks::delete_task_handler),
        )
        .route("/user", post(users::register_user_handler))
        .route("/user/activated", put(users::activate_user_handler))
        .route("/user/login", post(users::login_handler))
        .route(
            "/user/{id}",
            get(users::get_user_handler)
                .put(users::update_user_handler)
                .delete(users::delete_user_handler),
        );

    Router::new()
        .route("/health", get(health::health_handler))
        .nest("/api/v1", api_routes)
        .fallback(fallback::not_found_handler)
        .method_not_allowed_fallback(fallback::method_not_allowed_handler)
        .layer(from_fn_with_state(app_state.clone(), middleware::authenticate))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
