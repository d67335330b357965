//! Public task listing, keyed to a signed Telegram WebApp identity.

use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use tapquest_core::model::AnnotatedTask;
use tapquest_core::telegram;

use super::response::{ApiError, ApiResult};
use super::server::AppState;
use crate::store::{TaskStore, UserStore};

#[derive(Debug, Deserialize)]
pub struct TasksQuery {
    #[serde(rename = "initData")]
    pub init_data: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TasksResponse {
    pub tasks: Vec<AnnotatedTask>,
}

/// `GET /api/tasks?initData=<signed telegram payload>`
///
/// 400 without init data or a user id in it, 403 on a bad signature, 404
/// when the verified identity has no account; otherwise the active tasks
/// annotated with the caller's completion state.
pub async fn list_tasks_for_user(
    State(state): State<AppState>,
    Query(query): Query<TasksQuery>,
) -> ApiResult<Json<TasksResponse>> {
    let init_data = query
        .init_data
        .filter(|raw| !raw.is_empty())
        .ok_or_else(|| ApiError::bad_request("Invalid request"))?;

    let verified = telegram::validate_init_data(
        &init_data,
        &state.telegram.bot_token,
        state.telegram.init_data_max_age_secs,
    )?;

    let telegram_id = verified
        .user
        .map(|user| user.id.to_string())
        .ok_or_else(|| ApiError::bad_request("Invalid user data"))?;

    let user = UserStore::new(state.db.pool().clone())
        .find_by_telegram_id(&telegram_id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    let tasks = TaskStore::new(state.db.pool().clone())
        .list_active_for_user(user.id)
        .await?;

    Ok(Json(TasksResponse { tasks }))
}
