use std::collections::BTreeMap;

use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use classroom_core::AppError;
use serde::Serialize;
use tracing::{debug, error};

/// Body returned for missing records and unmatched routes.
pub const NOT_FOUND_MESSAGE: &str = "the requested resource could not be found";

/// Body returned for unexpected failures. Details go to the log only.
pub const SERVER_ERROR_MESSAGE: &str =
    "the server encountered a problem and could not process your request";

/// API error payload.
#[derive(Debug, Serialize)]
pub struct ErrorResponse<T: Serialize> {
    error: T,
}

impl<T: Serialize> ErrorResponse<T> {
    pub fn new(error: T) -> Self {
        Self { error }
    }
}

/// HTTP API error wrapper around core application errors.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(value: AppError) -> Self {
        Self(value)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(AppError::Validation(rejection.body_text()))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self(AppError::Validation(rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self.0 {
            AppError::Validation(message) => message_response(StatusCode::BAD_REQUEST, message),
            AppError::InvalidFields(fields) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(ErrorResponse::new(fields)),
            )
                .into_response(),
            AppError::NotFound(detail) => {
                debug!(%detail, "resource not found");
                message_response(StatusCode::NOT_FOUND, NOT_FOUND_MESSAGE.to_owned())
            }
            AppError::Conflict(message) => message_response(StatusCode::CONFLICT, message),
            AppError::Duplicate { field } => {
                let message = format!("a record with this {field} already exists");
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    Json(ErrorResponse::new(BTreeMap::from([(field, message)]))),
                )
                    .into_response()
            }
            AppError::Unauthorized(message) => {
                let mut response = message_response(StatusCode::UNAUTHORIZED, message);
                response
                    .headers_mut()
                    .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
                response
            }
            AppError::Forbidden(message) => message_response(StatusCode::FORBIDDEN, message),
            AppError::Internal(detail) => {
                error!(error = %detail, "request failed");
                message_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    SERVER_ERROR_MESSAGE.to_owned(),
                )
            }
        }
    }
}

fn message_response(status: StatusCode, message: String) -> Response {
    (status, Json(ErrorResponse::new(message))).into_response()
}

/// Standard API result type.
pub type ApiResult<T> = Result<T, ApiError>;
