use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A player, keyed by their Telegram identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub telegram_id: String,
    pub name: String,
    pub is_premium: bool,
    pub points: i64,
    pub points_balance: i64,
    pub referral_points: i64,
    pub last_login_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Per-user completion/progress state for a task. Read path only.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserTask {
    pub user_id: Uuid,
    pub task_id: Uuid,
    pub task_start_timestamp: Option<DateTime<Utc>>,
    pub is_completed: bool,
}
