use axum::Json;
use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use classroom_core::AppError;

use crate::error::{ApiError, ErrorResponse};

pub async fn not_found_handler() -> ApiError {
    ApiError(AppError::NotFound("no route matches the request".to_owned()))
}

pub async fn method_not_allowed_handler(method: Method) -> Response {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(ErrorResponse::new(format!(
            "the {method} method is not supported for this resource"
        ))),
    )
        .into_response()
}
