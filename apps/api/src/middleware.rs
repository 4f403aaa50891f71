use axum::extract::{Request, State};
use axum::http::{HeaderMap, HeaderValue, header};
use axum::middleware::Next;
use axum::response::Response;
use classroom_application::INVALID_AUTHENTICATION_TOKEN;
use classroom_core::AppError;

use crate::error::ApiResult;
use crate::state::AppState;

/// Resolves the caller identity from the `Authorization` header and attaches
/// it to the request. Requests without the header continue anonymously.
pub async fn authenticate(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> ApiResult<Response> {
    let bearer_token = bearer_token(request.headers())?;
    let identity = state
        .token_service
        .resolve_identity(bearer_token.as_deref())
        .await?;

    request.extensions_mut().insert(identity);

    let mut response = next.run(request).await;
    response
        .headers_mut()
        .append(header::VARY, HeaderValue::from_static("Authorization"));
    Ok(response)
}

fn bearer_token(headers: &HeaderMap) -> Result<Option<String>, AppError> {
    let Some(value) = headers.get(header::AUTHORIZATION) else {
        return Ok(None);
    };

    value
        .to_str()
        .ok()
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|token| Some(token.to_owned()))
        .ok_or_else(|| AppError::Unauthorized(INVALID_AUTHENTICATION_TOKEN.to_owned()))
}
