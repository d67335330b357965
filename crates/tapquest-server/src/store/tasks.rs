use std::collections::HashMap;

use chrono::Utc;
use sqlx::sqlite::{SqlitePool, SqliteRow};
use sqlx::{Row, Sqlite, Transaction};
use tracing::debug;
use uuid::Uuid;

use tapquest_core::model::{
    AnnotatedTask, Reward, RewardDraft, Task, TaskData, TaskDataInput, TaskDraft, TaskType,
};
use tapquest_core::{Error, Result};

use super::{parse_opt_timestamp, parse_uuid};

/// Task + reward repository.
///
/// Every multi-row write runs in a single transaction: readers observe the
/// pre-write or post-write state, never an intermediate one. Updates use
/// replace-all semantics for rewards (delete and recreate, fresh ids); no
/// reviewed consumer holds reward ids across edits.
pub struct TaskStore {
    pool: SqlitePool,
}

impl TaskStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// All tasks with their rewards eagerly attached.
    pub async fn list_all(&self) -> Result<Vec<Task>> {
        let rows = sqlx::query("SELECT * FROM tasks ORDER BY created_at, id")
            .fetch_all(&self.pool)
            .await?;

        let mut tasks = rows
            .iter()
            .map(task_from_row)
            .collect::<Result<Vec<_>>>()?;

        let reward_rows = sqlx::query("SELECT * FROM rewards ORDER BY task_id, position")
            .fetch_all(&self.pool)
            .await?;
        let mut by_task = group_rewards(&reward_rows)?;

        for task in &mut tasks {
            task.rewards = by_task.remove(&task.id).unwrap_or_default();
        }

        Ok(tasks)
    }

    /// One task with rewards, or NotFound.
    pub async fn get(&self, id: Uuid) -> Result<Task> {
        let row = sqlx::query("SELECT * FROM tasks WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Task {} not found", id)))?;

        let mut task = task_from_row(&row)?;

        let reward_rows =
            sqlx::query("SELECT * FROM rewards WHERE task_id = ? ORDER BY position")
                .bind(id.to_string())
                .fetch_all(&self.pool)
                .await?;
        task.rewards = reward_rows
            .iter()
            .map(reward_from_row)
            .collect::<Result<Vec<_>>>()?;

        Ok(task)
    }

    /// Persist a validated task and its rewards atomically.
    pub async fn create(&self, draft: &TaskDraft) -> Result<Task> {
        let id = Uuid::new_v4();
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO tasks
                (id, title, description, points, type, category, image,
                 call_to_action, task_data, is_active, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(id.to_string())
        .bind(&draft.title)
        .bind(&draft.description)
        .bind(draft.points)
        .bind(draft.task_type.as_str())
        .bind(&draft.category)
        .bind(&draft.image)
        .bind(&draft.call_to_action)
        .bind(serde_json::to_string(&draft.task_data.to_wire())?)
        .bind(draft.is_active)
        .bind(Utc::now().to_rfc3339())
        .execute(&mut *tx)
        .await?;

        insert_rewards(&mut tx, id, &draft.rewards).await?;
        tx.commit().await?;

        debug!(task_id = %id, rewards = draft.rewards.len(), "Created task");
        self.get(id).await
    }

    /// Replace a task wholesale: update scalar fields, delete all existing
    /// rewards, insert the new list as fresh rows. All-or-nothing.
    pub async fn replace(&self, id: Uuid, draft: &TaskDraft) -> Result<Task> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE tasks
            SET title = ?, description = ?, points = ?, type = ?, category = ?,
                image = ?, call_to_action = ?, task_data = ?, is_active = ?
            WHERE id = ?
            "#,
        )
        .bind(&draft.title)
        .bind(&draft.description)
        .bind(draft.points)
        .bind(draft.task_type.as_str())
        .bind(&draft.category)
        .bind(&draft.image)
        .bind(&draft.call_to_action)
        .bind(serde_json::to_string(&draft.task_data.to_wire())?)
        .bind(draft.is_active)
        .bind(id.to_string())
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("Task {} not found", id)));
        }

        sqlx::query("DELETE FROM rewards WHERE task_id = ?")
            .bind(id.to_string())
            .execute(&mut *tx)
            .await?;

        insert_rewards(&mut tx, id, &draft.rewards).await?;
        tx.commit().await?;

        debug!(task_id = %id, rewards = draft.rewards.len(), "Replaced task");
        self.get(id).await
    }

    /// Active tasks annotated with one user's completion state.
    ///
    /// Tasks the user has not started carry a null start timestamp and
    /// `is_completed: false`.
    pub async fn list_active_for_user(&self, user_id: Uuid) -> Result<Vec<AnnotatedTask>> {
        let rows = sqlx::query(
            r#"
            SELECT t.*, ut.task_start_timestamp, ut.is_completed
            FROM tasks t
            LEFT JOIN user_tasks ut ON ut.task_id = t.id AND ut.user_id = ?
            WHERE t.is_active = 1
            ORDER BY t.created_at, t.id
            "#,
        )
        .bind(user_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        let reward_rows = sqlx::query(
            r#"
            SELECT r.* FROM rewards r
            JOIN tasks t ON t.id = r.task_id
            WHERE t.is_active = 1
            ORDER BY r.task_id, r.position
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        let mut by_task = group_rewards(&reward_rows)?;

        let mut annotated = Vec::with_capacity(rows.len());
        for row in &rows {
            let mut task = task_from_row(row)?;
            task.rewards = by_task.remove(&task.id).unwrap_or_default();

            let started: Option<String> = row.try_get("task_start_timestamp")?;
            let is_completed: Option<bool> = row.try_get("is_completed")?;

            annotated.push(AnnotatedTask {
                task,
                task_start_timestamp: parse_opt_timestamp(started)?,
                is_completed: is_completed.unwrap_or(false),
            });
        }

        Ok(annotated)
    }
}

async fn insert_rewards(
    tx: &mut Transaction<'_, Sqlite>,
    task_id: Uuid,
    rewards: &[RewardDraft],
) -> Result<()> {
    for (position, reward) in rewards.iter().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO rewards
                (id, task_id, title, description, type, amount, image, is_active, position)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(task_id.to_string())
        .bind(&reward.title)
        .bind(&reward.description)
        .bind(reward.reward_type.as_str())
        .bind(reward.amount)
        .bind(reward.image.as_deref())
        .bind(reward.is_active)
        .bind(position as i64)
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}

fn task_from_row(row: &SqliteRow) -> Result<Task> {
    let id: String = row.try_get("id")?;
    let task_type: TaskType = row.try_get::<String, _>("type")?.parse()?;
    let raw: TaskDataInput = serde_json::from_str(&row.try_get::<String, _>("task_data")?)?;

    Ok(Task {
        id: parse_uuid(&id)?,
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        points: row.try_get("points")?,
        task_type,
        category: row.try_get("category")?,
        image: row.try_get("image")?,
        call_to_action: row.try_get("call_to_action")?,
        task_data: TaskData::from_input(task_type, &raw)?,
        is_active: row.try_get("is_active")?,
        rewards: Vec::new(),
    })
}

fn reward_from_row(row: &SqliteRow) -> Result<Reward> {
    let id: String = row.try_get("id")?;
    let task_id: String = row.try_get("task_id")?;

    Ok(Reward {
        id: parse_uuid(&id)?,
        task_id: parse_uuid(&task_id)?,
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        reward_type: row.try_get::<String, _>("type")?.parse()?,
        amount: row.try_get("amount")?,
        image: row.try_get("image")?,
        is_active: row.try_get("is_active")?,
    })
}

fn group_rewards(rows: &[SqliteRow]) -> Result<HashMap<Uuid, Vec<Reward>>> {
    let mut by_task: HashMap<Uuid, Vec<Reward>> = HashMap::new();
    for row in rows {
        let reward = reward_from_row(row)?;
        by_task.entry(reward.task_id).or_default().push(reward);
    }
    Ok(by_task)
}
