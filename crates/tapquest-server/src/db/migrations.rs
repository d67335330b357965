//! Embedded schema migrations.
//!
//! SQLite is single-writer, so a plain applied-set table is enough; each
//! migration runs inside its own transaction.

use std::collections::HashSet;

use sqlx::sqlite::SqlitePool;
use tracing::{debug, info};

use tapquest_core::{Error, Result};

/// A single named migration.
#[derive(Debug, Clone)]
pub struct Migration {
    /// Unique name (e.g. "0001_initial").
    pub name: String,
    /// SQL to execute.
    pub sql: String,
}

impl Migration {
    pub fn new(name: impl Into<String>, sql: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sql: sql.into(),
        }
    }
}

/// The built-in schema.
pub fn builtin_migrations() -> Vec<Migration> {
    vec![Migration::new(
        "0001_initial",
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY,
            telegram_id TEXT NOT NULL UNIQUE,
            name TEXT NOT NULL DEFAULT '',
            is_premium INTEGER NOT NULL DEFAULT 0,
            points INTEGER NOT NULL DEFAULT 0,
            points_balance INTEGER NOT NULL DEFAULT 0,
            referral_points INTEGER NOT NULL DEFAULT 0,
            last_login_date TEXT,
            created_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS tasks (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL CHECK (length(title) BETWEEN 1 AND 100),
            description TEXT NOT NULL CHECK (length(description) BETWEEN 1 AND 200),
            points INTEGER CHECK (points IS NULL OR points >= 0),
            type TEXT NOT NULL,
            category TEXT NOT NULL CHECK (length(category) > 0),
            image TEXT NOT NULL CHECK (length(image) > 0),
            call_to_action TEXT NOT NULL CHECK (length(call_to_action) > 0),
            task_data TEXT NOT NULL DEFAULT '{}',
            is_active INTEGER NOT NULL DEFAULT 1,
            created_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS rewards (
            id TEXT PRIMARY KEY,
            task_id TEXT NOT NULL REFERENCES tasks(id) ON DELETE CASCADE,
            title TEXT NOT NULL CHECK (length(title) > 0),
            description TEXT NOT NULL CHECK (length(description) > 0),
            type TEXT NOT NULL,
            amount REAL NOT NULL CHECK (amount > 0),
            image TEXT,
            is_active INTEGER NOT NULL DEFAULT 1,
            position INTEGER NOT NULL DEFAULT 0
        );
        CREATE INDEX IF NOT EXISTS idx_rewards_task_id ON rewards(task_id);

        CREATE TABLE IF NOT EXISTS user_tasks (
            user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            task_id TEXT NOT NULL REFERENCES tasks(id) ON DELETE CASCADE,
            task_start_timestamp TEXT,
            is_completed INTEGER NOT NULL DEFAULT 0,
            PRIMARY KEY (user_id, task_id)
        );
        "#,
    )]
}

/// Applies pending migrations and records them in `_tapquest_migrations`.
pub struct MigrationRunner {
    pool: SqlitePool,
}

impl MigrationRunner {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Run all pending migrations in order.
    pub async fn run(&self, migrations: Vec<Migration>) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS _tapquest_migrations (
                name TEXT PRIMARY KEY,
                applied_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| Error::Database(format!("Failed to create migrations table: {}", e)))?;

        let applied: HashSet<String> =
            sqlx::query_as::<_, (String,)>("SELECT name FROM _tapquest_migrations")
                .fetch_all(&self.pool)
                .await
                .map_err(|e| Error::Database(e.to_string()))?
                .into_iter()
                .map(|(name,)| name)
                .collect();

        for migration in migrations {
            if applied.contains(&migration.name) {
                debug!(name = %migration.name, "Migration already applied");
                continue;
            }

            let mut tx = self.pool.begin().await?;

            sqlx::raw_sql(&migration.sql)
                .execute(&mut *tx)
                .await
                .map_err(|e| {
                    Error::Database(format!("Migration {} failed: {}", migration.name, e))
                })?;

            sqlx::query("INSERT INTO _tapquest_migrations (name, applied_at) VALUES (?, ?)")
                .bind(&migration.name)
                .bind(chrono::Utc::now().to_rfc3339())
                .execute(&mut *tx)
                .await
                .map_err(|e| Error::Database(e.to_string()))?;

            tx.commit().await?;
            info!(name = %migration.name, "Applied migration");
        }

        Ok(())
    }
}
