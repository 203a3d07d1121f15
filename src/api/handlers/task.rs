use axum::extract::{Json, Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use validator::Validate;

use crate::api::auth::AuthUser;
use crate::api::AppState;
use crate::error::AppResult;
use crate::model::task::{CreateTask, DeleteTask, Task, TaskFilter, UpdateTask};

pub async fn task_list(
    State(state): State<AppState>,
    user: AuthUser,
    Query(filter): Query<TaskFilter>,
) -> AppResult<impl IntoResponse> {
    let tasks = state.task_service.list_tasks(user.user_id, &filter).await?;

    Ok(Json(serde_json::json!({ "tasks": tasks })))
}

pub async fn add_task(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateTask>,
) -> AppResult<impl IntoResponse> {
    payload.validate()?;

    let task = state.task_service.create_task(user.user_id, payload).await?;

    Ok((StatusCode::CREATED, Json(task)))
}

pub async fn get_task(
    State(state): State<AppState>,
    user: AuthUser,
    Path(task_id): Path<i64>,
) -> AppResult<Json<Task>> {
    let task = state.task_service.get_task(user.user_id, task_id).await?;

    Ok(Json(task))
}

pub async fn update_task(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<UpdateTask>,
) -> AppResult<Json<Task>> {
    let task = state.task_service.update_task(user.user_id, payload).await?;

    Ok(Json(task))
}

pub async fn delete_task(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<DeleteTask>,
) -> AppResult<impl IntoResponse> {
    state
        .task_service
        .delete_task(user.user_id, payload.task_id)
        .await?;

    Ok(Json(serde_json::json!({ "message": "Task deleted" })))
}
