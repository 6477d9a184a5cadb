use std::fmt;

use teloxide::types::ChatId;

/// A single chat's interest in a single repository.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Subscription {
    /// The subscribed chat.
    pub chat_id: ChatId,
    /// Full repository name, `owner/name`.
    pub repository: String,
}

impl Subscription {
    /// Creates a subscription of `chat_id` to `repository`.
    pub fn new(chat_id: ChatId, repository: impl Into<String>) -> Self {
        Self { chat_id, repository: repository.into() }
    }
}

impl fmt::Display for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.chat_id, self.repository)
    }
}
