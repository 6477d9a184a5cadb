use std::{
    collections::{HashMap, HashSet},
    str::FromStr,
};

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{
    FromRow, Pool, Sqlite,
    migrate,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};
use teloxide::types::ChatId;

use crate::storage::{StorageError, StorageResult, SubscriptionStorage};

#[derive(Debug, FromRow)]
struct SubscriptionRow {
    chat_id: i64,
    repository_full_name: String,
}

/// Subscriptions persisted in a single SQLite table.
///
/// The `(chat_id, repository_full_name)` unique index is the only source of
/// truth, and every mutation is a single statement whose `rows_affected`
/// tells whether the pair existed.
pub struct SqliteStorage {
    pool: Pool<Sqlite>,
}

impl SqliteStorage {
    /// Opens (creating if needed) the database at `database_url` and applies
    /// pending migrations.
    pub async fn new(database_url: &str) -> StorageResult<Self> {
        tracing::debug!("Connecting to SQLite database: {database_url}");
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        if let Some(dir) = options.get_filename().parent().filter(|dir| !dir.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(dir)
                .await
                .map_err(|e| StorageError::DbError(format!("Failed to create {}: {e}", dir.display())))?;
        }
        let pool = SqlitePoolOptions::new().connect_with(options).await?;

        migrate!("./migrations").run(&pool).await?;
        tracing::debug!("SQLite database migrated");

        Ok(Self { pool })
    }
}

#[async_trait]
impl SubscriptionStorage for SqliteStorage {
    async fn add_subscription(&self, chat_id: ChatId, repository: &str) -> StorageResult<()> {
        tracing::debug!("Adding subscription to SQLite: {chat_id} -> {repository}");

        let result = sqlx::query(
            "INSERT OR IGNORE INTO subscriptions (chat_id, repository_full_name, created_at) \
             VALUES (?, ?, ?)",
        )
        .bind(chat_id.0)
        .bind(repository)
        .bind(Utc::now().timestamp())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::AlreadyExists { chat_id, repository: repository.to_string() });
        }
        Ok(())
    }

    async fn remove_subscription(&self, chat_id: ChatId, repository: &str) -> StorageResult<()> {
        tracing::debug!("Removing subscription from SQLite: {chat_id} -> {repository}");

        let result = sqlx::query(
            "DELETE FROM subscriptions WHERE chat_id = ? AND repository_full_name = ?",
        )
        .bind(chat_id.0)
        .bind(repository)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound { chat_id, repository: repository.to_string() });
        }
        Ok(())
    }

    async fn contains(&self, chat_id: ChatId, repository: &str) -> StorageResult<bool> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM subscriptions WHERE chat_id = ? AND repository_full_name = ?",
        )
        .bind(chat_id.0)
        .bind(repository)
        .fetch_one(&self.pool)
        .await?;

        Ok(count > 0)
    }

    async fn subscribers_of(&self, repository: &str) -> StorageResult<HashSet<ChatId>> {
        let chat_ids: Vec<i64> =
            sqlx::query_scalar("SELECT chat_id FROM subscriptions WHERE repository_full_name = ?")
                .bind(repository)
                .fetch_all(&self.pool)
                .await?;

        Ok(chat_ids.into_iter().map(ChatId).collect())
    }

    async fn repositories_of(&self, chat_id: ChatId) -> StorageResult<HashSet<String>> {
        let repos: Vec<String> =
            sqlx::query_scalar("SELECT repository_full_name FROM subscriptions WHERE chat_id = ?")
                .bind(chat_id.0)
                .fetch_all(&self.pool)
                .await?;

        Ok(repos.into_iter().collect())
    }

    async fn all_subscriptions(&self) -> StorageResult<HashMap<String, HashSet<ChatId>>> {
        tracing::debug!("Getting all subscriptions from SQLite");

        let rows: Vec<SubscriptionRow> =
            sqlx::query_as("SELECT chat_id, repository_full_name FROM subscriptions")
                .fetch_all(&self.pool)
                .await?;

        let mut result: HashMap<String, HashSet<ChatId>> = HashMap::new();
        for row in rows {
            result.entry(row.repository_full_name).or_default().insert(ChatId(row.chat_id));
        }
        Ok(result)
    }
}
