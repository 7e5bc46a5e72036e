//! Task CRUD. Everything here runs under the authenticated user's scope.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use taskdeck_store::{tasks, Task, TaskPatch};

use crate::api::{store_error, ApiError, ApiJson, ApiQuery, ErrorResponse};
use crate::auth::AuthUser;
use crate::state::AppState;

#[derive(Debug, Serialize, ToSchema)]
pub struct TaskResponse {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Task> for TaskResponse {
    fn from(task: Task) -> Self {
        Self {
            id: task.id,
            title: task.title,
            description: task.description,
            completed: task.completed,
            created_at: task.created_at,
            updated_at: task.updated_at,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateTaskRequest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateTaskRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub completed: Option<bool>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListTasksQuery {
    /// Rows to skip (default 0).
    #[serde(default)]
    pub skip: i64,
    /// Page size, capped at 100 (default 20).
    #[serde(default = "default_limit")]
    pub limit: i64,
    /// Filter by completion state; omit for all tasks.
    #[serde(default)]
    pub completed: Option<bool>,
}

fn default_limit() -> i64 {
    20
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StatisticsResponse {
    pub total_tasks: i64,
    pub pending_tasks: i64,
    pub completed_tasks: i64,
    pub completion_rate: f64,
    pub tasks_created_today: i64,
    pub tasks_completed_today: i64,
    pub streak_days: i64,
}

/// List the caller's active tasks, newest first.
#[utoipa::path(
    get,
    path = "/tasks",
    tag = "tasks",
    params(ListTasksQuery),
    responses(
        (status = 200, description = "Tasks for the current user", body = [TaskResponse]),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    )
)]
pub async fn list_tasks(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    ApiQuery(query): ApiQuery<ListTasksQuery>,
) -> Result<Json<Vec<TaskResponse>>, ApiError> {
    let tasks = tasks::list(&state.pool, user_id, query.skip, query.limit, query.completed)
        .await
        .map_err(store_error)?;
    Ok(Json(tasks.into_iter().map(TaskResponse::from).collect()))
}

/// Create a task.
#[utoipa::path(
    post,
    path = "/tasks",
    tag = "tasks",
    request_body = CreateTaskRequest,
    responses(
        (status = 201, description = "Task created", body = TaskResponse),
        (status = 400, description = "Invalid title", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    )
)]
pub async fn create_task(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    ApiJson(req): ApiJson<CreateTaskRequest>,
) -> Result<(StatusCode, Json<TaskResponse>), ApiError> {
    let task = tasks::create(&state.pool, user_id, &req.title, req.description.as_deref())
        .await
        .map_err(store_error)?;
    Ok((StatusCode::CREATED, Json(task.into())))
}

/// Fetch a single task.
#[utoipa::path(
    get,
    path = "/tasks/{id}",
    tag = "tasks",
    params(("id" = Uuid, Path, description = "Task id")),
    responses(
        (status = 200, description = "The task", body = TaskResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 404, description = "Task not found", body = ErrorResponse)
    )
)]
pub async fn get_task(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<TaskResponse>, ApiError> {
    let task = tasks::get(&state.pool, id, user_id)
        .await
        .map_err(store_error)?;
    Ok(Json(task.into()))
}

/// Partially update a task; omitted fields are untouched.
#[utoipa::path(
    put,
    path = "/tasks/{id}",
    tag = "tasks",
    params(("id" = Uuid, Path, description = "Task id")),
    request_body = UpdateTaskRequest,
    responses(
        (status = 200, description = "Updated task", body = TaskResponse),
        (status = 400, description = "Invalid title", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 404, description = "Task not found", body = ErrorResponse)
    )
)]
pub async fn update_task(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    ApiJson(req): ApiJson<UpdateTaskRequest>,
) -> Result<Json<TaskResponse>, ApiError> {
    let patch = TaskPatch {
        title: req.title,
        description: req.description,
        completed: req.completed,
    };
    let task = tasks::update(&state.pool, id, user_id, patch)
        .await
        .map_err(store_error)?;
    Ok(Json(task.into()))
}

/// Soft-delete a task.
#[utoipa::path(
    delete,
    path = "/tasks/{id}",
    tag = "tasks",
    params(("id" = Uuid, Path, description = "Task id")),
    responses(
        (status = 204, description = "Task deleted"),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 404, description = "Task not found", body = ErrorResponse)
    )
)]
pub async fn delete_task(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    tasks::soft_delete(&state.pool, id, user_id)
        .await
        .map_err(store_error)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Flip a task's completion state.
#[utoipa::path(
    patch,
    path = "/tasks/{id}/complete",
    tag = "tasks",
    params(("id" = Uuid, Path, description = "Task id")),
    responses(
        (status = 200, description = "Toggled task", body = TaskResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 404, description = "Task not found", body = ErrorResponse)
    )
)]
pub async fn toggle_task(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<TaskResponse>, ApiError> {
    let task = tasks::toggle_complete(&state.pool, id, user_id)
        .await
        .map_err(store_error)?;
    Ok(Json(task.into()))
}

/// Aggregate statistics over the caller's active tasks.
#[utoipa::path(
    get,
    path = "/tasks/statistics",
    tag = "tasks",
    responses(
        (status = 200, description = "Task statistics", body = StatisticsResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    )
)]
pub async fn task_statistics(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<StatisticsResponse>, ApiError> {
    let stats = tasks::statistics(&state.pool, user_id)
        .await
        .map_err(store_error)?;
    Ok(Json(StatisticsResponse {
        total_tasks: stats.total_tasks,
        pending_tasks: stats.pending_tasks,
        completed_tasks: stats.completed_tasks,
        completion_rate: stats.completion_rate,
        tasks_created_today: stats.tasks_created_today,
        tasks_completed_today: stats.tasks_completed_today,
        streak_days: stats.streak_days,
    }))
}
