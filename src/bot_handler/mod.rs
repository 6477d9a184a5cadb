mod commands;
#[cfg(test)]
mod tests;

use std::sync::Arc;

use teloxide::{
    types::{ChatId, Message},
    utils::command::{BotCommands, ParseError},
};
use thiserror::Error;

use crate::{
    bot_handler::commands::{CommandContext, CommandHandler},
    messaging::{MessagingError, MessagingService},
    storage::SubscriptionStorage,
};

/// Errors raised while handling a chat command.
#[derive(Debug, Error)]
pub enum BotHandlerError {
    /// A command argument was malformed.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    /// The reply could not be sent.
    #[error("Failed to send message: {0}")]
    SendMessageError(#[from] MessagingError),
}

/// Result type of the command handlers.
pub type BotHandlerResult<T> = Result<T, BotHandlerError>;

/// Available commands:
#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "lowercase")]
pub enum Command {
    /// Start the bot and show the welcome message.
    Start,
    /// Show this help text.
    Help,
    /// Subscribe to pushes of a repository: /subscribe <owner/repo>.
    Subscribe(String),
    /// Unsubscribe from a repository: /unsubscribe <owner/repo>.
    Unsubscribe(String),
    /// List your subscriptions.
    List,
}

/// Handles chat commands against the subscription registry.
pub struct BotHandler {
    messaging_service: Arc<dyn MessagingService>,
    storage: Arc<dyn SubscriptionStorage>,
}

impl BotHandler {
    /// Creates a new `BotHandler` instance.
    pub fn new(
        messaging_service: Arc<dyn MessagingService>,
        storage: Arc<dyn SubscriptionStorage>,
    ) -> Self {
        Self { messaging_service, storage }
    }

    /// Dispatches an incoming command message to the appropriate handler.
    pub async fn handle_commands(&self, msg: &Message, cmd: Command) -> BotHandlerResult<()> {
        self.handle_command(msg.chat.id, cmd).await
    }

    /// Runs a parsed command on behalf of a chat.
    pub async fn handle_command(&self, chat_id: ChatId, cmd: Command) -> BotHandlerResult<()> {
        tracing::debug!("Handling command {cmd:?} for chat: {chat_id}");
        let ctx = CommandContext { handler: self, chat_id };
        cmd.handle(ctx).await
    }

    /// Replies to a message that looks like a command but did not parse as one.
    pub async fn handle_unknown_command(&self, chat_id: ChatId, text: &str) -> BotHandlerResult<()> {
        tracing::debug!("Unknown command {text:?} from chat: {chat_id}");
        self.messaging_service.send_unknown_command_msg(chat_id).await?;
        Ok(())
    }
}

/// Validates a `/subscribe` or `/unsubscribe` argument.
///
/// Exactly one whitespace-free token containing a `/` is accepted. The name is
/// otherwise used verbatim: no case folding, no URL parsing.
pub fn parse_repository_arg(arg: &str) -> BotHandlerResult<&str> {
    let mut tokens = arg.split_whitespace();
    match (tokens.next(), tokens.next()) {
        (Some(repo), None) if repo.contains('/') => Ok(repo),
        (None, _) => Err(BotHandlerError::InvalidInput("Repository name is missing".to_string())),
        (Some(_), None) => Err(BotHandlerError::InvalidInput(
            "Repository must be in the format owner/repo".to_string(),
        )),
        (Some(_), Some(_)) => {
            Err(BotHandlerError::InvalidInput("Expected exactly one repository".to_string()))
        }
    }
}

/// Whether `text` is a command this bot should answer with an unknown-command
/// notice.
///
/// Plain text is not a command. A command addressed to another bot
/// (`/cmd@otherbot`) belongs to that bot and is left alone.
pub fn is_unknown_command(text: &str, bot_username: &str) -> bool {
    text.starts_with('/')
        && matches!(Command::parse(text, bot_username), Err(ParseError::UnknownCommand(_)))
}
