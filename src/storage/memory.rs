use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use teloxide::types::ChatId;
use tokio::sync::RwLock;

use crate::storage::{StorageError, StorageResult, Subscription, SubscriptionStorage};

/// Subscriptions kept in process memory. Lost on restart.
///
/// All pairs live in a single set behind one `RwLock`. A mutation performs its
/// existence check and its insert/remove under the same write guard, so
/// concurrent callers linearize and readers never see a partial update.
#[derive(Default)]
pub struct InMemoryStorage {
    data: RwLock<HashSet<Subscription>>,
}

impl InMemoryStorage {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SubscriptionStorage for InMemoryStorage {
    async fn add_subscription(&self, chat_id: ChatId, repository: &str) -> StorageResult<()> {
        let subscription = Subscription::new(chat_id, repository);
        tracing::debug!("Adding subscription to memory: {subscription}");
        let mut data = self.data.write().await;
        if !data.insert(subscription) {
            return Err(StorageError::AlreadyExists { chat_id, repository: repository.to_string() });
        }
        Ok(())
    }

    async fn remove_subscription(&self, chat_id: ChatId, repository: &str) -> StorageResult<()> {
        let subscription = Subscription::new(chat_id, repository);
        tracing::debug!("Removing subscription from memory: {subscription}");
        let mut data = self.data.write().await;
        if !data.remove(&subscription) {
            return Err(StorageError::NotFound { chat_id, repository: repository.to_string() });
        }
        Ok(())
    }

    async fn contains(&self, chat_id: ChatId, repository: &str) -> StorageResult<bool> {
        let data = self.data.read().await;
        Ok(data.contains(&Subscription::new(chat_id, repository)))
    }

    async fn subscribers_of(&self, repository: &str) -> StorageResult<HashSet<ChatId>> {
        let data = self.data.read().await;
        Ok(data.iter().filter(|s| s.repository == repository).map(|s| s.chat_id).collect())
    }

    async fn repositories_of(&self, chat_id: ChatId) -> StorageResult<HashSet<String>> {
        let data = self.data.read().await;
        Ok(data.iter().filter(|s| s.chat_id == chat_id).map(|s| s.repository.clone()).collect())
    }

    async fn all_subscriptions(&self) -> StorageResult<HashMap<String, HashSet<ChatId>>> {
        let data = self.data.read().await;
        let mut result: HashMap<String, HashSet<ChatId>> = HashMap::new();
        for sub in data.iter() {
            result.entry(sub.repository.clone()).or_default().insert(sub.chat_id);
        }
        Ok(result)
    }
}
