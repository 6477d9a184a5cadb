use std::sync::Arc;

use teloxide::{
    dispatching::UpdateHandler,
    dptree::deps,
    prelude::*,
    types::Me,
};

use crate::bot_handler::{BotHandler, Command, is_unknown_command};

/// Encapsulates the dispatcher logic for the bot.
pub struct BotDispatcher {
    handler: Arc<BotHandler>,
}

/// Puts every update under the same key. One key means one worker, so chat
/// commands run strictly one after another in arrival order.
fn sequential_key(_: &Update) -> Option<()> {
    Some(())
}

impl BotDispatcher {
    /// Creates a new `BotDispatcher`.
    pub fn new(handler: Arc<BotHandler>) -> Self {
        Self { handler }
    }

    /// Builds the dispatcher using the provided `bot` instance.
    #[must_use = "This function returns a Dispatcher that should not be ignored"]
    pub fn build(&self, bot: Bot) -> Dispatcher<Bot, anyhow::Error, ()> {
        Dispatcher::builder(bot, Self::schema())
            .dependencies(deps![self.handler.clone()])
            .distribution_function(sequential_key)
            .enable_ctrlc_handler()
            .build()
    }

    /// The update handling tree: known commands first, then unknown commands
    /// meant for this bot. Free text falls through and is ignored.
    fn schema() -> UpdateHandler<anyhow::Error> {
        dptree::entry()
            .branch(Self::build_commands_branch())
            .branch(Self::build_unknown_command_branch())
    }

    /// Builds the branch for handling text commands.
    fn build_commands_branch() -> UpdateHandler<anyhow::Error> {
        Update::filter_message().filter_command::<Command>().endpoint(
            |msg: Message, cmd: Command, handler: Arc<BotHandler>| async move {
                handler.handle_commands(&msg, cmd).await?;
                Ok(())
            },
        )
    }

    /// Builds the branch replying to commands the bot does not know. Commands
    /// addressed to other bots fall through.
    fn build_unknown_command_branch() -> UpdateHandler<anyhow::Error> {
        Update::filter_message()
            .filter_map(|msg: Message, me: Me| {
                msg.text().filter(|text| is_unknown_command(text, me.username())).map(str::to_owned)
            })
            .endpoint(|msg: Message, text: String, handler: Arc<BotHandler>| async move {
                handler.handle_unknown_command(msg.chat.id, &text).await?;
                Ok(())
            })
    }
}
