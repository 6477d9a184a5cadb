#[cfg(test)]
mod tests;

use async_trait::async_trait;
use mockall::automock;
use teloxide::{
    prelude::*,
    types::{ChatId, ParseMode},
    utils::{command::BotCommands, html},
};
use thiserror::Error;

use crate::bot_handler::Command;

/// Errors raised while talking to Telegram.
#[derive(Debug, Error)]
pub enum MessagingError {
    /// The Bot API request failed.
    #[error("Teloxide API request failed: {0}")]
    TeloxideRequest(#[from] teloxide::RequestError),
}

type Result<T> = std::result::Result<T, MessagingError>;

/// Example repository used in usage hints.
const EXAMPLE_REPO: &str = "octocat/Hello-World";

/// Trait for sending messages to a chat.
#[automock]
#[async_trait]
pub trait MessagingService: Send + Sync {
    /// Sends an HTML-formatted text message to the provided chat.
    async fn send_response(&self, chat_id: ChatId, text: String) -> Result<()>;

    /// Sends a push notification produced by the formatter.
    async fn send_push_notification(&self, chat_id: ChatId, text: &str) -> Result<()>;

    /// Sends the welcome message.
    async fn send_start_msg(&self, chat_id: ChatId) -> Result<()>;

    /// Sends the list of available commands.
    async fn send_help_msg(&self, chat_id: ChatId) -> Result<()>;

    /// Sends usage instructions for a command that got malformed arguments.
    async fn send_usage_msg(&self, chat_id: ChatId, command: &str) -> Result<()>;

    /// Confirms a new subscription.
    async fn send_subscribed_msg(&self, chat_id: ChatId, repository: &str) -> Result<()>;

    /// Tells the user they already follow the repository.
    async fn send_already_subscribed_msg(&self, chat_id: ChatId, repository: &str) -> Result<()>;

    /// Confirms a removed subscription.
    async fn send_unsubscribed_msg(&self, chat_id: ChatId, repository: &str) -> Result<()>;

    /// Tells the user they do not follow the repository.
    async fn send_not_subscribed_msg(&self, chat_id: ChatId, repository: &str) -> Result<()>;

    /// Sends the chat's subscriptions. An empty list sends the "no
    /// subscriptions" message instead.
    async fn send_list_msg(&self, chat_id: ChatId, repositories: Vec<String>) -> Result<()>;

    /// Sends the notice for commands the bot does not know.
    async fn send_unknown_command_msg(&self, chat_id: ChatId) -> Result<()>;

    /// Sends a generic "try again" message after an internal failure.
    async fn send_error_msg(&self, chat_id: ChatId) -> Result<()>;
}

/// Telegram messaging service.
pub struct TelegramMessagingService {
    bot: Bot,
    /// Public base URL of the webhook server, shown in the subscribe hint.
    public_url: Option<String>,
}

impl TelegramMessagingService {
    /// Creates a service sending through `bot`.
    pub fn new(bot: Bot, public_url: Option<String>) -> Self {
        Self { bot, public_url }
    }

    fn start_text() -> String {
        "👋 Welcome to GitGram!\n\n\
         I will notify you about pushes to the GitHub repositories you subscribe to.\n\n\
         Use /help to see available commands."
            .to_string()
    }

    fn help_text() -> String {
        format!(
            "{}\n\nExample:\n/subscribe {EXAMPLE_REPO}",
            html::escape(&Command::descriptions().to_string())
        )
    }

    fn usage_text(command: &str) -> String {
        format!(
            "Usage: /{command} &lt;owner/repo&gt;\n\nExample: /{command} {EXAMPLE_REPO}",
            command = html::escape(command)
        )
    }

    fn subscribed_text(&self, repository: &str) -> String {
        let webhook_url = match &self.public_url {
            Some(base) => format!("{}/webhook", base.trim_end_matches('/')),
            None => "&lt;your-server-url&gt;/webhook".to_string(),
        };
        format!(
            "✅ Subscribed to <b>{}</b>.\n\n\
             You'll receive notifications when there are pushes to this repository.\n\n\
             🔗 Make sure the repository has a webhook:\n\
             Repository → Settings → Webhooks → Add webhook\n\
             Payload URL: <code>{}</code>\n\
             Content type: <code>application/json</code>",
            html::escape(repository),
            webhook_url,
        )
    }

    fn list_text(mut repositories: Vec<String>) -> String {
        if repositories.is_empty() {
            return "You have no active subscriptions.\n\n\
                    Use /subscribe &lt;owner/repo&gt; to add one."
                .to_string();
        }

        repositories.sort();
        let lines = repositories
            .iter()
            .enumerate()
            .map(|(i, repo)| format!("{}. {}", i + 1, html::escape(repo)))
            .collect::<Vec<_>>()
            .join("\n");

        format!(
            "📋 Your active subscriptions:\n\n{lines}\n\n\
             Use /unsubscribe &lt;owner/repo&gt; to remove a subscription."
        )
    }
}

#[async_trait]
impl MessagingService for TelegramMessagingService {
    async fn send_response(&self, chat_id: ChatId, text: String) -> Result<()> {
        self.bot
            .send_message(chat_id, text)
            .parse_mode(ParseMode::Html)
            .await
            .map(|_| ())
            .map_err(MessagingError::TeloxideRequest)
    }

    async fn send_push_notification(&self, chat_id: ChatId, text: &str) -> Result<()> {
        self.send_response(chat_id, text.to_string()).await
    }

    async fn send_start_msg(&self, chat_id: ChatId) -> Result<()> {
        self.send_response(chat_id, Self::start_text()).await
    }

    async fn send_help_msg(&self, chat_id: ChatId) -> Result<()> {
        self.send_response(chat_id, Self::help_text()).await
    }

    async fn send_usage_msg(&self, chat_id: ChatId, command: &str) -> Result<()> {
        self.send_response(chat_id, Self::usage_text(command)).await
    }

    async fn send_subscribed_msg(&self, chat_id: ChatId, repository: &str) -> Result<()> {
        self.send_response(chat_id, self.subscribed_text(repository)).await
    }

    async fn send_already_subscribed_msg(&self, chat_id: ChatId, repository: &str) -> Result<()> {
        let text = format!("ℹ️ You're already subscribed to <b>{}</b>.", html::escape(repository));
        self.send_response(chat_id, text).await
    }

    async fn send_unsubscribed_msg(&self, chat_id: ChatId, repository: &str) -> Result<()> {
        let text = format!("✅ Unsubscribed from <b>{}</b>.", html::escape(repository));
        self.send_response(chat_id, text).await
    }

    async fn send_not_subscribed_msg(&self, chat_id: ChatId, repository: &str) -> Result<()> {
        let text = format!("ℹ️ You're not subscribed to <b>{}</b>.", html::escape(repository));
        self.send_response(chat_id, text).await
    }

    async fn send_list_msg(&self, chat_id: ChatId, repositories: Vec<String>) -> Result<()> {
        self.send_response(chat_id, Self::list_text(repositories)).await
    }

    async fn send_unknown_command_msg(&self, chat_id: ChatId) -> Result<()> {
        let text = "❓ Unknown command. Use /help to see available commands.".to_string();
        self.send_response(chat_id, text).await
    }

    async fn send_error_msg(&self, chat_id: ChatId) -> Result<()> {
        let text = "⚠️ Something went wrong. Please try again.".to_string();
        self.send_response(chat_id, text).await
    }
}
