//! Task API endpoints
//!
//! RESTful API for owner-scoped task CRUD operations. Every handler resolves
//! the caller's identity from the bearer token first; single-record operations
//! then run the ownership policy before touching the store.

use std::str::FromStr;

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use tm_core::task::{policy, Task, TaskChanges, TaskFilter, TaskRepository, TaskStatus};
use tm_core::{Error as CoreError, Identity};

use crate::{auth::bearer_token, state::AppState};

// ============================================================================
// Request/Response types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ListTasksQuery {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateTaskRequest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateTaskRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// Wire shape of a task; the owner linkage never leaves the server
#[derive(Debug, Serialize)]
pub struct TaskResponse {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Task> for TaskResponse {
    fn from(task: Task) -> Self {
        Self {
            id: task.id,
            title: task.title,
            description: task.description,
            status: task.status,
            created_at: task.created_at.to_rfc3339(),
            updated_at: task.updated_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub message: String,
}

type RouteError = (StatusCode, Json<ErrorResponse>);

// ============================================================================
// Error helpers
// ============================================================================

fn route_error(status: StatusCode, message: impl Into<String>) -> RouteError {
    (
        status,
        Json(ErrorResponse {
            message: message.into(),
        }),
    )
}

fn unauthorized(message: impl Into<String>) -> RouteError {
    route_error(StatusCode::UNAUTHORIZED, message)
}

fn forbidden() -> RouteError {
    route_error(StatusCode::FORBIDDEN, "Forbidden")
}

fn not_found(message: impl Into<String>) -> RouteError {
    route_error(StatusCode::NOT_FOUND, message)
}

fn unprocessable(message: impl Into<String>) -> RouteError {
    route_error(StatusCode::UNPROCESSABLE_ENTITY, message)
}

fn internal_error(message: impl std::fmt::Display) -> RouteError {
    route_error(StatusCode::INTERNAL_SERVER_ERROR, message.to_string())
}

fn core_error(err: CoreError) -> RouteError {
    match err {
        CoreError::Validation { .. } => unprocessable(err.to_string()),
        CoreError::TaskNotFound(id) => not_found(format!("Task {} not found", id)),
        CoreError::Forbidden => forbidden(),
        other => internal_error(other),
    }
}

/// Resolve the caller's identity or fail with 401
async fn require_identity(
    state: &AppState,
    headers: &HeaderMap,
) -> Result<Identity, RouteError> {
    let token = bearer_token(headers).ok_or_else(|| unauthorized("Missing bearer token"))?;
    let user = state
        .auth_store()
        .authorize_bearer(token)
        .await
        .map_err(|err| unauthorized(err.to_string()))?;
    Ok(Identity::new(user.id))
}

/// Parse an optional status parameter; empty string means "no filter"
fn parse_status(raw: Option<&str>) -> Result<Option<TaskStatus>, RouteError> {
    match raw {
        None => Ok(None),
        Some(value) if value.trim().is_empty() => Ok(None),
        Some(value) => TaskStatus::from_str(value)
            .map(Some)
            .map_err(core_error),
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /tasks - List the caller's tasks, optionally filtered
async fn list_tasks(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<ListTasksQuery>,
) -> Result<Json<Vec<TaskResponse>>, RouteError> {
    let identity = require_identity(&state, &headers).await?;

    let status = parse_status(query.status.as_deref())?;
    let filter = TaskFilter::new(status, query.search);

    let tasks = state
        .task_store()
        .list(identity.id, &filter)
        .await
        .map_err(core_error)?;

    Ok(Json(tasks.into_iter().map(TaskResponse::from).collect()))
}

/// POST /tasks - Create a new task owned by the caller
async fn create_task(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<CreateTaskRequest>,
) -> Result<(StatusCode, Json<TaskResponse>), RouteError> {
    let identity = require_identity(&state, &headers).await?;

    let status = parse_status(req.status.as_deref())?;

    let mut task = Task::new(identity.id, req.title).map_err(core_error)?;
    if let Some(description) = req.description {
        task = task.with_description(description);
    }
    if let Some(status) = status {
        task = task.with_status(status);
    }

    let created = state.task_store().create(task).await.map_err(core_error)?;

    Ok((StatusCode::CREATED, Json(TaskResponse::from(created))))
}

/// GET /tasks/:id - Get a single task
async fn get_task(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<Json<TaskResponse>, RouteError> {
    let identity = require_identity(&state, &headers).await?;

    let task = state
        .task_store()
        .get(id)
        .await
        .map_err(core_error)?
        .ok_or_else(|| not_found(format!("Task {} not found", id)))?;
    policy::authorize(&identity, &task).map_err(core_error)?;

    Ok(Json(TaskResponse::from(task)))
}

/// PUT /tasks/:id - Update a task's caller-mutable fields
async fn update_task(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateTaskRequest>,
) -> Result<Json<TaskResponse>, RouteError> {
    let identity = require_identity(&state, &headers).await?;

    let mut task = state
        .task_store()
        .get(id)
        .await
        .map_err(core_error)?
        .ok_or_else(|| not_found(format!("Task {} not found", id)))?;
    policy::authorize(&identity, &task).map_err(core_error)?;

    let status = parse_status(req.status.as_deref())?;
    let changes = TaskChanges {
        title: req.title,
        description: req.description,
        status,
    };
    changes.apply_to(&mut task).map_err(core_error)?;

    let updated = state.task_store().update(task).await.map_err(core_error)?;

    Ok(Json(TaskResponse::from(updated)))
}

/// DELETE /tasks/:id - Delete a task
async fn delete_task(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, RouteError> {
    let identity = require_identity(&state, &headers).await?;

    let task = state
        .task_store()
        .get(id)
        .await
        .map_err(core_error)?
        .ok_or_else(|| not_found(format!("Task {} not found", id)))?;
    policy::authorize(&identity, &task).map_err(core_error)?;

    let deleted = state.task_store().delete(id).await.map_err(core_error)?;
    if !deleted {
        return Err(not_found(format!("Task {} not found", id)));
    }

    Ok(Json(MessageResponse {
        message: "Task deleted successfully".to_string(),
    }))
}

// ============================================================================
// Router
// ============================================================================

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/tasks", get(list_tasks).post(create_task))
        .route(
            "/tasks/{id}",
            get(get_task).put(update_task).delete(delete_task),
        )
}
