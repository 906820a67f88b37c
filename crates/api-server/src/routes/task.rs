//! Task API endpoints
//!
//! RESTful API for task CRUD and search. Mutating routes sit behind the
//! API key check.

use axum::{
    extract::State,
    http::StatusCode,
    middleware::from_fn_with_state,
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use tasks_core::task::{NewTask, Task, TaskId, TaskPatch};

use crate::{
    error::ApiError,
    extract::{JsonBody, QueryParams, TaskIdPath},
    middleware::require_api_key,
    state::AppState,
};

// ============================================================================
// Request/Response types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CreateTaskRequest {
    /// Missing names are reported by validation, not as a malformed body
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub completed: bool,
}

#[derive(Debug, Deserialize)]
pub struct UpdateTaskRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub completed: bool,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskResponse {
    pub id: TaskId,
    pub name: String,
    pub completed: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Task> for TaskResponse {
    fn from(task: Task) -> Self {
        Self {
            id: task.id,
            name: task.name,
            completed: task.completed,
            created_at: task.created_at.to_rfc3339(),
            updated_at: task.updated_at.to_rfc3339(),
        }
    }
}

fn to_responses(tasks: Vec<Task>) -> Json<Vec<TaskResponse>> {
    Json(tasks.into_iter().map(TaskResponse::from).collect())
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /tasks - List all tasks
async fn list_tasks(
    State(state): State<AppState>,
) -> Result<Json<Vec<TaskResponse>>, ApiError> {
    let tasks = state.task_store().list().await?;
    Ok(to_responses(tasks))
}

/// POST /tasks - Create a new task
async fn create_task(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<CreateTaskRequest>,
) -> Result<(StatusCode, Json<TaskResponse>), ApiError> {
    state.validator().validate_name(&req.name)?;

    let task = NewTask::new(req.name).with_completed(req.completed);
    let created = state.task_store().create(task).await?;

    Ok((StatusCode::CREATED, Json(TaskResponse::from(created))))
}

/// GET /tasks/search?q= - Find tasks whose name contains `q`
async fn search_tasks(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<SearchQuery>,
) -> Result<Json<Vec<TaskResponse>>, ApiError> {
    let q = query
        .q
        .filter(|q| !q.is_empty())
        .ok_or_else(|| ApiError::bad_request("Query parameter 'q' is required"))?;

    let tasks = state.task_store().search(&q).await?;
    Ok(to_responses(tasks))
}

/// GET /tasks/{id} - Get a single task
async fn get_task(
    State(state): State<AppState>,
    TaskIdPath(id): TaskIdPath,
) -> Result<Json<TaskResponse>, ApiError> {
    let task = state.task_store().get(id).await?;
    Ok(Json(TaskResponse::from(task)))
}

/// PUT /tasks/{id} - Replace a task's name and completion flag
async fn update_task(
    State(state): State<AppState>,
    TaskIdPath(id): TaskIdPath,
    JsonBody(req): JsonBody<UpdateTaskRequest>,
) -> Result<Json<TaskResponse>, ApiError> {
    state.validator().validate_name(&req.name)?;

    let updated = state
        .task_store()
        .update(id, TaskPatch::new(req.name, req.completed))
        .await?;

    Ok(Json(TaskResponse::from(updated)))
}

/// DELETE /tasks/{id} - Soft-delete a task
async fn delete_task(
    State(state): State<AppState>,
    TaskIdPath(id): TaskIdPath,
) -> Result<StatusCode, ApiError> {
    state.task_store().delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Router
// ============================================================================

pub fn router(state: &AppState) -> Router<AppState> {
    let auth = from_fn_with_state(state.clone(), require_api_key);

    Router::new()
        .route(
            "/tasks",
            get(list_tasks).merge(post(create_task).route_layer(auth.clone())),
        )
        .route("/tasks/search", get(search_tasks))
        .route(
            "/tasks/{id}",
            get(get_task).merge(put(update_task).delete(delete_task).route_layer(auth)),
        )
}
