use std::collections::HashMap;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use classroom_domain::CLASSROOM_SORT_SAFELIST;
use tracing::debug;

use crate::dto::{
    ClassroomListResponse, ClassroomResponse, CreateClassroomRequest, DeleteResponse, ListParams,
    UpdateClassroomRequest,
};
use crate::error::ApiResult;
use crate::extract::{ApiJson, ApiQuery, ResourceId};
use crate::gates::{ActivatedUser, ClassWrite, Permitted};
use crate::state::AppState;

pub async fn create_classroom_handler(
    State(state): State<AppState>,
    _caller: ActivatedUser,
    ApiJson(payload): ApiJson<CreateClassroomRequest>,
) -> ApiResult<(StatusCode, Json<ClassroomResponse>)> {
    let classroom = state.classroom_service.create(payload.into()).await?;

    Ok((StatusCode::CREATED, Json(ClassroomResponse { classroom })))
}

pub async fn list_classrooms_handler(
    State(state): State<AppState>,
    _caller: ActivatedUser,
    ApiQuery(query): ApiQuery<HashMap<String, String>>,
) -> ApiResult<Json<ClassroomListResponse>> {
    let params = ListParams::from_query(&query, "name", CLASSROOM_SORT_SAFELIST);
    let page = state
        .classroom_service
        .list(&params.text, &params.filters, params.validator)
        .await?;

    Ok(Json(ClassroomListResponse {
        classrooms: page.items,
        metadata: page.metadata,
    }))
}

pub async fn get_classroom_handler(
    State(state): State<AppState>,
    _caller: ActivatedUser,
    ResourceId(classroom_id): ResourceId,
) -> ApiResult<Json<ClassroomResponse>> {
    let classroom = state.classroom_service.get(classroom_id).await?;

    Ok(Json(ClassroomResponse { classroom }))
}

pub async fn update_classroom_handler(
    State(state): State<AppState>,
    _caller: ActivatedUser,
    ResourceId(classroom_id): ResourceId,
    ApiJson(payload): ApiJson<UpdateClassroomRequest>,
) -> ApiResult<Json<ClassroomResponse>> {
    let classroom = state
        .classroom_service
        .update(classroom_id, payload.into())
        .await?;

    Ok(Json(ClassroomResponse { classroom }))
}

pub async fn delete_classroom_handler(
    State(state): State<AppState>,
    caller: Permitted<ClassWrite>,
    ResourceId(classroom_id): ResourceId,
) -> ApiResult<Json<DeleteResponse>> {
    debug!(
        classroom_id,
        user_id = caller.user.user_id(),
        "classroom delete requested"
    );
    state.classroom_service.delete(classroom_id).await?;

    Ok(Json(DeleteResponse::success()))
}
