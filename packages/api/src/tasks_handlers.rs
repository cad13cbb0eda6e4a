// ABOUTME: HTTP request handlers for task operations
// ABOUTME: CRUD endpoints for the authenticated user's tasks with derived status

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use todo_core::format_millis;
use todo_tasks::{TaskCreateInput, TaskStatus, TaskUpdateInput, TaskWithStatus};

use crate::auth::CurrentUser;
use crate::error::{ApiResult, AppError};
use crate::response::ApiResponse;
use crate::state::AppState;

/// Task as returned to clients
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskResponse {
    pub id: i64,
    pub content: String,
    pub priority: Option<String>,
    /// RFC 3339 due date, absent when the task has no deadline
    pub date: Option<String>,
    pub due_time: i64,
    pub is_completed: bool,
    pub status: TaskStatus,
    pub created_at: i64,
    pub updated_at: i64,
}

impl From<TaskWithStatus> for TaskResponse {
    fn from(value: TaskWithStatus) -> Self {
        let TaskWithStatus { task, status } = value;
        Self {
            id: task.id,
            date: format_millis(task.due_time),
            content: task.content,
            priority: task.priority,
            due_time: task.due_time,
            is_completed: task.is_completed,
            status,
            created_at: task.created_at,
            updated_at: task.updated_at,
        }
    }
}

/// Request body for creating a task
#[derive(Debug, Deserialize)]
pub struct CreateTaskRequest {
    pub content: String,
    /// Due time in milliseconds since the epoch
    pub date: Option<i64>,
    pub priority: Option<String>,
}

/// Request body for a partial task update
#[derive(Debug, Deserialize)]
pub struct UpdateTaskRequest {
    pub content: Option<String>,
    pub priority: Option<String>,
    /// Due time in milliseconds since the epoch, 0 clears it
    pub date: Option<i64>,
    #[serde(rename = "isCompleted")]
    pub is_completed: Option<bool>,
}

fn validate_content(content: &str) -> ApiResult<()> {
    if content.trim().is_empty() {
        return Err(AppError::validation("content must not be empty"));
    }
    Ok(())
}

fn validate_due_time(date: Option<i64>) -> ApiResult<()> {
    match date {
        Some(ms) if ms < 0 => Err(AppError::validation("date must not be negative")),
        _ => Ok(()),
    }
}

/// List the current user's tasks
pub async fn list_tasks(
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<Json<ApiResponse<Vec<TaskResponse>>>> {
    info!("Listing tasks for user: {}", user.id);

    let tasks = state.tasks.list_tasks(user.id).await?;
    Ok(Json(ApiResponse::success(
        tasks.into_iter().map(TaskResponse::from).collect(),
    )))
}

/// Get a single task by ID
pub async fn get_task(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(task_id): Path<i64>,
) -> ApiResult<Json<ApiResponse<TaskResponse>>> {
    info!("Getting task: {}", task_id);

    let task = state.tasks.get_task(user.id, task_id).await?;
    Ok(Json(ApiResponse::success(task.into())))
}

/// Create a new task
pub async fn create_task(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(request): Json<CreateTaskRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<TaskResponse>>)> {
    info!("Creating task for user: {}", user.id);

    validate_content(&request.content)?;
    validate_due_time(request.date)?;

    let input = TaskCreateInput {
        content: request.content,
        due_time: request.date,
        priority: request.priority,
    };

    let task = state.tasks.create_task(user.id, input).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(task.into()))))
}

/// Apply a partial update and return the task as stored
pub async fn update_task(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(task_id): Path<i64>,
    Json(request): Json<UpdateTaskRequest>,
) -> ApiResult<Json<ApiResponse<TaskResponse>>> {
    info!("Updating task: {}", task_id);

    if let Some(content) = &request.content {
        validate_content(content)?;
    }
    validate_due_time(request.date)?;

    let fields = TaskUpdateInput {
        content: request.content,
        priority: request.priority,
        due_time: request.date,
        is_completed: request.is_completed,
    };

    state
        .tasks
        .apply_partial_update(user.id, task_id, fields)
        .await?;

    let task = state.tasks.get_task(user.id, task_id).await?;
    Ok(Json(ApiResponse::success(task.into())))
}

/// Delete a task
pub async fn delete_task(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(task_id): Path<i64>,
) -> ApiResult<Json<ApiResponse<()>>> {
    info!("Deleting task: {}", task_id);

    state.tasks.delete_task(user.id, task_id).await?;
    Ok(Json(ApiResponse::success(())))
}
