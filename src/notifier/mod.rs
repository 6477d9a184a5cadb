
use std::sync::Arc;

use futures::{StreamExt, stream};
use teloxide::types::ChatId;
use thiserror::Error;

use crate::{
    github::PushEvent,
    messaging::MessagingService,
    notification::format_push_event,
    storage::{StorageError, SubscriptionStorage},
};

/// Errors that stop a push event from being relayed at all.
#[derive(Debug, Error)]
pub enum NotifierError {
    /// The event has no `repository.full_name`.
    #[error("Repository name is missing")]
    MissingRepository,
    /// Subscribers could not be resolved.
    #[error("Failed to look up subscribers: {0}")]
    Storage(#[from] StorageError),
}

type Result<T> = std::result::Result<T, NotifierError>;

/// Outcome of fanning one push event out to its subscribers.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DeliveryReport {
    /// Number of chats subscribed to the repository.
    pub subscribers: usize,
    /// Number of chats the notification was delivered to.
    pub delivered: usize,
}

impl DeliveryReport {
    /// Number of subscribers the notification could not be delivered to.
    pub fn failed(&self) -> usize {
        self.subscribers - self.delivered
    }
}

/// Relays push events to every chat subscribed to the pushed repository.
#[derive(Clone)]
pub struct PushNotifier {
    storage: Arc<dyn SubscriptionStorage>,
    messaging_service: Arc<dyn MessagingService>,
    // The maximum number of deliveries in flight at once.
    max_concurrency: usize,
}

impl PushNotifier {
    /// Create a new PushNotifier.
    pub fn new(
        storage: Arc<dyn SubscriptionStorage>,
        messaging_service: Arc<dyn MessagingService>,
        max_concurrency: usize,
    ) -> Self {
        Self { storage, messaging_service, max_concurrency: max_concurrency.max(1) }
    }

    /// Formats the event once and sends it to each subscriber.
    ///
    /// Deliveries are independent: a failed send is logged and counted but
    /// neither retried nor allowed to affect the other subscribers.
    pub async fn notify(&self, event: &PushEvent) -> Result<DeliveryReport> {
        let repository = event.repository.full_name.as_str();
        if repository.is_empty() {
            return Err(NotifierError::MissingRepository);
        }

        let subscribers = self.storage.subscribers_of(repository).await?;
        if subscribers.is_empty() {
            tracing::debug!("No subscribers found for repository: {repository}");
            return Ok(DeliveryReport::default());
        }

        tracing::debug!("Found {} subscriber(s) for repository: {repository}", subscribers.len());

        let message = format_push_event(event);
        let total = subscribers.len();

        let delivered = stream::iter(subscribers)
            .map(|chat_id| self.deliver(chat_id, repository, &message))
            .buffer_unordered(self.max_concurrency)
            .fold(0, |delivered, ok| async move { if ok { delivered + 1 } else { delivered } })
            .await;

        let report = DeliveryReport { subscribers: total, delivered };
        tracing::info!(
            repository,
            subscribers = total,
            delivered,
            failed = report.failed(),
            "Sent push notifications to {delivered}/{total} subscribers"
        );

        Ok(report)
    }

    /// Send the notification to a single chat. Returns whether it was delivered.
    async fn deliver(&self, chat_id: ChatId, repository: &str, message: &str) -> bool {
        match self.messaging_service.send_push_notification(chat_id, message).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("Failed to send push notification for {repository} to chat {chat_id}: {e}");
                false
            }
        }
    }
}
