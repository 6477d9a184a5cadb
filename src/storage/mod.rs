mod memory;
/// SQLite-backed registry.
pub mod sqlite;
mod subscription;

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
pub use memory::InMemoryStorage;
use mockall::automock;
pub use subscription::Subscription;
use teloxide::types::ChatId;
use thiserror::Error;

/// Errors raised by the subscription registry.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The pair is already registered.
    #[error("Chat {chat_id} is already subscribed to {repository}")]
    AlreadyExists {
        /// The subscribing chat.
        chat_id: ChatId,
        /// The repository it already follows.
        repository: String,
    },
    /// The pair is not registered.
    #[error("Chat {chat_id} is not subscribed to {repository}")]
    NotFound {
        /// The unsubscribing chat.
        chat_id: ChatId,
        /// The repository it does not follow.
        repository: String,
    },
    /// The backing database failed.
    #[error("Database error: {0}")]
    DbError(String),
}

impl From<sqlx::Error> for StorageError {
    fn from(err: sqlx::Error) -> Self {
        StorageError::DbError(err.to_string())
    }
}

impl From<sqlx::migrate::MigrateError> for StorageError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        StorageError::DbError(err.to_string())
    }
}

/// Result type of registry operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// The subscription registry.
///
/// Owns the chat to repository relation. Implementations keep one source of
/// truth for the pairs, so "subscribers of a repository" and "repositories of
/// a chat" are two queries over the same data and can never disagree.
/// Repository names are opaque, case-sensitive keys.
#[automock]
#[async_trait]
pub trait SubscriptionStorage: Send + Sync {
    /// Subscribe a chat to a repository. Fails with
    /// [`StorageError::AlreadyExists`] if the pair is already present.
    async fn add_subscription(&self, chat_id: ChatId, repository: &str) -> StorageResult<()>;

    /// Unsubscribe a chat from a repository. Fails with
    /// [`StorageError::NotFound`] if the pair is absent.
    async fn remove_subscription(&self, chat_id: ChatId, repository: &str) -> StorageResult<()>;

    /// Check if a chat is subscribed to a repository.
    async fn contains(&self, chat_id: ChatId, repository: &str) -> StorageResult<bool>;

    /// Get all chats subscribed to a repository.
    async fn subscribers_of(&self, repository: &str) -> StorageResult<HashSet<ChatId>>;

    /// Get all repositories a chat is subscribed to.
    async fn repositories_of(&self, chat_id: ChatId) -> StorageResult<HashSet<String>>;

    /// Get every subscription grouped by repository.
    async fn all_subscriptions(&self) -> StorageResult<HashMap<String, HashSet<ChatId>>>;
}
