use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    error::{ApiError, ApiResult},
    tasks::{
        dto::{CreateTaskRequest, MessageResponse, OwnerQuery, UpdateTaskRequest},
        repo::{Task, TaskStatus},
        AppState,
    },
};

pub fn task_routes() -> Router<AppState> {
    Router::new()
        .route("/tasks", get(list_tasks).post(create_task))
        .route(
            "/tasks/:id",
            get(get_task).put(update_task).delete(delete_task),
        )
}

fn require_owner(user_id: Option<i64>) -> ApiResult<i64> {
    user_id.ok_or_else(|| ApiError::Validation("User ID required".into()))
}

#[instrument(skip(state))]
pub async fn list_tasks(
    State(state): State<AppState>,
    Query(q): Query<OwnerQuery>,
) -> ApiResult<Json<Vec<Task>>> {
    let owner = require_owner(q.user_id)?;
    let tasks = Task::list_by_owner(&state.db, owner).await?;
    Ok(Json(tasks))
}

#[instrument(skip(state))]
pub async fn get_task(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(q): Query<OwnerQuery>,
) -> ApiResult<Json<Task>> {
    let owner = require_owner(q.user_id)?;
    let task = Task::get_owned(&state.db, id, owner)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".into()))?;
    Ok(Json(task))
}

#[instrument(skip(state, payload))]
pub async fn create_task(
    State(state): State<AppState>,
    Json(payload): Json<CreateTaskRequest>,
) -> ApiResult<(StatusCode, Json<Task>)> {
    let missing = || ApiError::Validation("Title and user ID required".into());
    let owner = payload.user_id.ok_or_else(missing)?;
    if payload.title.is_empty() {
        warn!(user_id = owner, "create task with empty title");
        return Err(missing());
    }

    let task = Task::create(&state.db, owner, &payload.title, &payload.description).await?;

    info!(task_id = task.id, user_id = owner, "task created");
    Ok((StatusCode::CREATED, Json(task)))
}

#[instrument(skip(state, payload))]
pub async fn update_task(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateTaskRequest>,
) -> ApiResult<Json<Task>> {
    let owner = require_owner(payload.user_id)?;
    if payload.title.is_empty() {
        warn!(task_id = id, user_id = owner, "update task with empty title");
        return Err(ApiError::Validation("Title required".into()));
    }
    let status: TaskStatus = payload.status.parse()?;

    let task = Task::update_owned(
        &state.db,
        id,
        owner,
        &payload.title,
        &payload.description,
        status,
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("Task not found".into()))?;

    info!(task_id = id, user_id = owner, status = %status, "task updated");
    Ok(Json(task))
}

#[instrument(skip(state))]
pub async fn delete_task(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(q): Query<OwnerQuery>,
) -> ApiResult<Json<MessageResponse>> {
    let owner = require_owner(q.user_id)?;

    if !Task::delete_owned(&state.db, id, owner).await? {
        return Err(ApiError::NotFound("Task not found".into()));
    }

    info!(task_id = id, user_id = owner, "task deleted");
    Ok(Json(MessageResponse {
        message: "Task successfully deleted".into(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn require_owner_rejects_missing_id() {
        let err = require_owner(None).unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
        assert_eq!(require_owner(Some(5)).unwrap(), 5);
    }

    #[test]
    fn update_status_parse_feeds_validation_error() {
        let payload: UpdateTaskRequest = serde_json::from_str(
            r#"{"title": "x", "description": "", "status": "done", "userId": 1}"#,
        )
        .unwrap();
        let err = payload.status.parse::<TaskStatus>().unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }
}
