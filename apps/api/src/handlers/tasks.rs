use std::collections::HashMap;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use classroom_domain::TASK_SORT_SAFELIST;
use tracing::debug;

use crate::dto::{
    CreateTaskRequest, DeleteResponse, ListParams, TaskListResponse, TaskResponse,
    UpdateTaskRequest,
};
use crate::error::ApiResult;
use crate::extract::{ApiJson, ApiQuery, ResourceId};
use crate::gates::{Permitted, TaskRead, TaskWrite};
use crate::state::AppState;

pub async fn create_task_handler(
    State(state): State<AppState>,
    _caller: Permitted<TaskWrite>,
    ApiJson(payload): ApiJson<CreateTaskRequest>,
) -> ApiResult<(StatusCode, Json<TaskResponse>)> {
    let task = state.task_service.create(payload.into()).await?;

    Ok((StatusCode::CREATED, Json(TaskResponse { task })))
}

pub async fn list_tasks_handler(
    State(state): State<AppState>,
    _caller: Permitted<TaskRead>,
    ApiQuery(query): ApiQuery<HashMap<String, String>>,
) -> ApiResult<Json<TaskListResponse>> {
    let params = ListParams::from_query(&query, "header", TASK_SORT_SAFELIST);
    let page = state
        .task_service
        .list(&params.text, &params.filters, params.validator)
        .await?;

    Ok(Json(TaskListResponse {
        tasks: page.items,
        metadata: page.metadata,
    }))
}

pub async fn get_task_handler(
    State(state): State<AppState>,
    _caller: Permitted<TaskRead>,
    ResourceId(task_id): ResourceId,
) -> ApiResult<Json<TaskResponse>> {
    let task = state.task_service.get(task_id).await?;

    Ok(Json(TaskResponse { task }))
}

pub async fn update_task_handler(
    State(state): State<AppState>,
    _caller: Permitted<TaskWrite>,
    ResourceId(task_id): ResourceId,
    ApiJson(payload): ApiJson<UpdateTaskRequest>,
) -> ApiResult<Json<TaskResponse>> {
    let task = state.task_service.update(task_id, payload.into()).await?;

    Ok(Json(TaskResponse { task }))
}

pub async fn delete_task_handler(
    State(state): State<AppState>,
    caller: Permitted<TaskWrite>,
    ResourceId(task_id): ResourceId,
) -> ApiResult<Json<DeleteResponse>> {
    debug!(task_id, user_id = caller.user.user_id(), "task delete requested");
    state.task_service.delete(task_id).await?;

    Ok(Json(DeleteResponse::success()))
}
