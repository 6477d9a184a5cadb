use crate::{
    bot_handler::{BotHandlerResult, commands::CommandContext, parse_repository_arg},
    storage::StorageError,
};

pub async fn handle(ctx: CommandContext<'_>, arg: &str) -> BotHandlerResult<()> {
    let repository = match parse_repository_arg(arg) {
        Ok(repository) => repository,
        Err(e) => {
            tracing::debug!("Rejected /subscribe argument {arg:?}: {e}");
            ctx.handler.messaging_service.send_usage_msg(ctx.chat_id, "subscribe").await?;
            return Ok(());
        }
    };

    match ctx.handler.storage.add_subscription(ctx.chat_id, repository).await {
        Ok(()) => {
            tracing::info!("Chat {} subscribed to {repository}", ctx.chat_id);
            ctx.handler.messaging_service.send_subscribed_msg(ctx.chat_id, repository).await?;
        }
        Err(StorageError::AlreadyExists { .. }) => {
            tracing::debug!("Chat {} is already subscribed to {repository}", ctx.chat_id);
            ctx.handler
                .messaging_service
                .send_already_subscribed_msg(ctx.chat_id, repository)
                .await?;
        }
        Err(e) => {
            tracing::error!("Failed to subscribe chat {} to {repository}: {e}", ctx.chat_id);
            ctx.handler.messaging_service.send_error_msg(ctx.chat_id).await?;
        }
    }
    Ok(())
}
