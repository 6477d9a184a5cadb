pub mod help;
pub mod list;
pub mod start;
pub mod subscribe;
pub mod unsubscribe;

use async_trait::async_trait;
use teloxide::types::ChatId;

use crate::bot_handler::{BotHandler, BotHandlerResult, Command};

/// A common trait for command handlers.
#[async_trait]
pub trait CommandHandler {
    async fn handle(self, ctx: CommandContext<'_>) -> BotHandlerResult<()>;
}

/// CommandContext groups the data needed by all command handlers.
#[derive(Clone, Copy)]
pub struct CommandContext<'a> {
    pub handler: &'a BotHandler,
    pub chat_id: ChatId,
}

#[async_trait]
impl CommandHandler for Command {
    async fn handle(self, ctx: CommandContext<'_>) -> BotHandlerResult<()> {
        match self {
            Command::Start => start::handle(ctx).await,
            Command::Help => help::handle(ctx).await,
            Command::Subscribe(arg) => subscribe::handle(ctx, &arg).await,
            Command::Unsubscribe(arg) => unsubscribe::handle(ctx, &arg).await,
            Command::List => list::handle(ctx).await,
        }
    }
}
