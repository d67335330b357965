use serde::Serialize;
use sqlx::sqlite::{SqlitePool, SqliteRow};
use sqlx::Row;

use tapquest_core::model::User;
use tapquest_core::{Error, Result};

use super::{parse_opt_timestamp, parse_timestamp, parse_uuid};

/// Export page size.
pub const EXPORT_PAGE_SIZE: i64 = 100_000;

/// Wire field name → users column, with the value kind for projection.
const EXPORT_FIELDS: &[(&str, &str, FieldKind)] = &[
    ("id", "id", FieldKind::Text),
    ("telegramId", "telegram_id", FieldKind::Text),
    ("name", "name", FieldKind::Text),
    ("isPremium", "is_premium", FieldKind::Bool),
    ("points", "points", FieldKind::Int),
    ("pointsBalance", "points_balance", FieldKind::Int),
    ("referralPoints", "referral_points", FieldKind::Int),
    ("lastLoginDate", "last_login_date", FieldKind::OptText),
    ("createdAt", "created_at", FieldKind::Text),
];

#[derive(Debug, Clone, Copy)]
enum FieldKind {
    Text,
    OptText,
    Int,
    Bool,
}

/// One page of a raw user field projection.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportPage {
    pub users: Vec<serde_json::Value>,
    pub page: i64,
    pub total_pages: i64,
    pub has_more: bool,
}

/// User repository.
pub struct UserStore {
    pool: SqlitePool,
}

impl UserStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Look up a user by their Telegram identity.
    pub async fn find_by_telegram_id(&self, telegram_id: &str) -> Result<Option<User>> {
        let row = sqlx::query("SELECT * FROM users WHERE telegram_id = ?")
            .bind(telegram_id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(user_from_row).transpose()
    }

    /// Insert a user record.
    pub async fn insert(&self, user: &User) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO users
                (id, telegram_id, name, is_premium, points, points_balance,
                 referral_points, last_login_date, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(user.id.to_string())
        .bind(&user.telegram_id)
        .bind(&user.name)
        .bind(user.is_premium)
        .bind(user.points)
        .bind(user.points_balance)
        .bind(user.referral_points)
        .bind(user.last_login_date.map(|ts| ts.to_rfc3339()))
        .bind(user.created_at.to_rfc3339())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Project the requested fields for one page of users.
    ///
    /// Field names are the camelCase wire names; anything outside the
    /// whitelist is rejected before any SQL is built.
    pub async fn export(&self, fields: &[String], page: i64) -> Result<ExportPage> {
        if fields.is_empty() {
            return Err(Error::InvalidArgument(
                "fields must be a non-empty array".to_string(),
            ));
        }
        if page < 0 {
            return Err(Error::InvalidArgument(
                "page must be non-negative".to_string(),
            ));
        }

        let mut selected = Vec::with_capacity(fields.len());
        for field in fields {
            let entry = EXPORT_FIELDS
                .iter()
                .find(|(wire, _, _)| wire == field)
                .ok_or_else(|| {
                    Error::InvalidArgument(format!("Unknown export field: {}", field))
                })?;
            selected.push(entry);
        }

        let columns = selected
            .iter()
            .map(|(_, column, _)| *column)
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "SELECT {} FROM users ORDER BY created_at, id LIMIT ? OFFSET ?",
            columns
        );

        let rows = sqlx::query(&sql)
            .bind(EXPORT_PAGE_SIZE)
            .bind(page * EXPORT_PAGE_SIZE)
            .fetch_all(&self.pool)
            .await?;

        let mut users = Vec::with_capacity(rows.len());
        for row in &rows {
            let mut object = serde_json::Map::new();
            for (wire, column, kind) in &selected {
                object.insert(wire.to_string(), read_field(row, column, *kind)?);
            }
            users.push(serde_json::Value::Object(object));
        }

        let (total,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        let total_pages = (total + EXPORT_PAGE_SIZE - 1) / EXPORT_PAGE_SIZE;

        Ok(ExportPage {
            users,
            page,
            total_pages,
            has_more: page < total_pages - 1,
        })
    }
}

fn read_field(row: &SqliteRow, column: &str, kind: FieldKind) -> Result<serde_json::Value> {
    let value = match kind {
        FieldKind::Text => serde_json::Value::String(row.try_get::<String, _>(column)?),
        FieldKind::OptText => row
            .try_get::<Option<String>, _>(column)?
            .map(serde_json::Value::String)
            .unwrap_or(serde_json::Value::Null),
        FieldKind::Int => serde_json::Value::from(row.try_get::<i64, _>(column)?),
        FieldKind::Bool => serde_json::Value::from(row.try_get::<bool, _>(column)?),
    };
    Ok(value)
}

fn user_from_row(row: &SqliteRow) -> Result<User> {
    let id: String = row.try_get("id")?;
    let last_login_date: Option<String> = row.try_get("last_login_date")?;
    let created_at: String = row.try_get("created_at")?;

    Ok(User {
        id: parse_uuid(&id)?,
        telegram_id: row.try_get("telegram_id")?,
        name: row.try_get("name")?,
        is_premium: row.try_get("is_premium")?,
        points: row.try_get("points")?,
        points_balance: row.try_get("points_balance")?,
        referral_points: row.try_get("referral_points")?,
        last_login_date: parse_opt_timestamp(last_login_date)?,
        created_at: parse_timestamp(&created_at)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    fn sample_user(telegram_id: &str, points: i64) -> User {
        User {
            id: Uuid::new_v4(),
            telegram_id: telegram_id.to_string(),
            name: format!("player-{}", telegram_id),
            is_premium: false,
            points,
            points_balance: points,
            referral_points: 0,
            last_login_date: None,
            created_at: Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
        }
    }

    async fn store() -> (UserStore, Database) {
        let db = Database::in_memory().await.unwrap();
        db.migrate().await.unwrap();
        (UserStore::new(db.pool().clone()), db)
    }

    #[tokio::test]
    async fn test_insert_and_find_by_telegram_id() {
        let (store, _db) = store().await;

        let user = sample_user("4242", 1000);
        store.insert(&user).await.unwrap();

        let found = store.find_by_telegram_id("4242").await.unwrap().unwrap();
        assert_eq!(found.id, user.id);
        assert_eq!(found.points, 1000);
        assert!(found.last_login_date.is_none());

        assert!(store.find_by_telegram_id("9999").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_export_projects_requested_fields() {
        let (store, _db) = store().await;
        store.insert(&sample_user("1", 10)).await.unwrap();
        store.insert(&sample_user("2", 20)).await.unwrap();

        let page = store
            .export(&["telegramId".to_string(), "points".to_string()], 0)
            .await
            .unwrap();

        assert_eq!(page.users.len(), 2);
        assert_eq!(page.page, 0);
        assert_eq!(page.total_pages, 1);
        assert!(!page.has_more);

        let first = page.users[0].as_object().unwrap();
        assert_eq!(first.len(), 2);
        assert!(first.contains_key("telegramId"));
        assert!(first.contains_key("points"));
    }

    #[tokio::test]
    async fn test_export_rejects_unknown_field() {
        let (store, _db) = store().await;
        let result = store.export(&["passwordHash".to_string()], 0).await;
        assert!(matches!(result, Err(Error::InvalidArgument(_))));
    }

    #[tokio::test]
    async fn test_export_rejects_empty_fields() {
        let (store, _db) = store().await;
        let result = store.export(&[], 0).await;
        assert!(matches!(result, Err(Error::InvalidArgument(_))));
    }
}
