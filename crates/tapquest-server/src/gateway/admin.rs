//! Admin route handlers: task CRUD and the user export projection.

use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use tapquest_core::model::{Task, TaskInput};

use super::response::{ApiError, ApiResult};
use super::server::AppState;
use crate::store::{ExportPage, TaskStore, UserStore};

/// `GET /api/admin/tasks`
pub async fn list_tasks(State(state): State<AppState>) -> ApiResult<Json<Vec<Task>>> {
    let tasks = TaskStore::new(state.db.pool().clone()).list_all().await?;
    Ok(Json(tasks))
}

/// `GET /api/admin/tasks/{id}`
pub async fn get_task(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Task>> {
    let task = TaskStore::new(state.db.pool().clone()).get(id).await?;
    Ok(Json(task))
}

/// `POST /api/admin/tasks`
pub async fn create_task(
    State(state): State<AppState>,
    Json(body): Json<serde_json::Value>,
) -> ApiResult<Json<Task>> {
    let draft = parse_task(body)?.validate()?;
    let task = TaskStore::new(state.db.pool().clone()).create(&draft).await?;
    Ok(Json(task))
}

/// `PUT /api/admin/tasks/{id}`
pub async fn update_task(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<serde_json::Value>,
) -> ApiResult<Json<Task>> {
    let draft = parse_task(body)?.validate()?;
    let task = TaskStore::new(state.db.pool().clone())
        .replace(id, &draft)
        .await?;
    Ok(Json(task))
}

/// `PUT /api/admin/tasks` — update variant taking the id in the body.
pub async fn update_task_by_body(
    State(state): State<AppState>,
    Json(body): Json<serde_json::Value>,
) -> ApiResult<Json<Task>> {
    let input = parse_task(body)?;
    let id = input
        .id
        .ok_or_else(|| ApiError::bad_request("id is required"))?;
    let draft = input.validate()?;
    let task = TaskStore::new(state.db.pool().clone())
        .replace(id, &draft)
        .await?;
    Ok(Json(task))
}

#[derive(Debug, Deserialize)]
struct ExportRequest {
    fields: Vec<String>,
    #[serde(default)]
    page: i64,
}

/// `POST /api/admin/export`
pub async fn export_users(
    State(state): State<AppState>,
    Json(body): Json<serde_json::Value>,
) -> ApiResult<Json<ExportPage>> {
    let request: ExportRequest = serde_json::from_value(body)
        .map_err(|e| ApiError::bad_request(format!("Invalid export request: {}", e)))?;

    let page = UserStore::new(state.db.pool().clone())
        .export(&request.fields, request.page)
        .await?;
    Ok(Json(page))
}

/// Malformed payloads are the caller's fault, not a 422 or a 500.
fn parse_task(body: serde_json::Value) -> Result<TaskInput, ApiError> {
    serde_json::from_value(body)
        .map_err(|e| ApiError::bad_request(format!("Invalid task payload: {}", e)))
}
