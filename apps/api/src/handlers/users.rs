use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use classroom_domain::UserId;

use crate::dto::{
    ActivateUserRequest, AuthenticationTokenResponse, DeleteResponse, LoginRequest,
    RegisterUserRequest, RegistrationResponse, UpdateUserRequest, UserResponse,
};
use crate::error::ApiResult;
use crate::extract::{ApiJson, ResourceId};
use crate::gates::ActivatedUser;
use crate::state::AppState;

pub async fn register_user_handler(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<RegisterUserRequest>,
) -> ApiResult<(StatusCode, Json<RegistrationResponse>)> {
    let registration = state.user_service.register(payload.into()).await?;

    Ok((
        StatusCode::CREATED,
        Json(RegistrationResponse::from(registration)),
    ))
}

pub async fn activate_user_handler(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<ActivateUserRequest>,
) -> ApiResult<Json<UserResponse>> {
    let user = state.user_service.activate(&payload.token).await?;

    Ok(Json(UserResponse { user }))
}

pub async fn login_handler(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<LoginRequest>,
) -> ApiResult<(StatusCode, Json<AuthenticationTokenResponse>)> {
    let authentication_token = state
        .user_service
        .login(&payload.email, &payload.password)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(AuthenticationTokenResponse {
            authentication_token,
        }),
    ))
}

pub async fn get_user_handler(
    State(state): State<AppState>,
    ActivatedUser(caller): ActivatedUser,
    ResourceId(user_id): ResourceId,
) -> ApiResult<Json<UserResponse>> {
    let user = state
        .user_service
        .get(&caller, UserId::new(user_id))
        .await?;

    Ok(Json(UserResponse { user }))
}

pub async fn update_user_handler(
    State(state): State<AppState>,
    ActivatedUser(caller): ActivatedUser,
    ResourceId(user_id): ResourceId,
    ApiJson(payload): ApiJson<UpdateUserRequest>,
) -> ApiResult<Json<UserResponse>> {
    let user = state
        .user_service
        .update_profile(&caller, UserId::new(user_id), payload.into())
        .await?;

    Ok(Json(UserResponse { user }))
}

pub async fn delete_user_handler(
    State(state): State<AppState>,
    ActivatedUser(caller): ActivatedUser,
    ResourceId(user_id): ResourceId,
) -> ApiResult<Json<DeleteResponse>> {
    state
        .user_service
        .delete(&caller, UserId::new(user_id))
        .await?;

    Ok(Json(DeleteResponse::success()))
}
