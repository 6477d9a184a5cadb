use crate::{
    bot_handler::{BotHandlerResult, commands::CommandContext, parse_repository_arg},
    storage::StorageError,
};

pub async fn handle(ctx: CommandContext<'_>, arg: &str) -> BotHandlerResult<()> {
    let Ok(repository) = parse_repository_arg(arg) else {
        ctx.handler.messaging_service.send_usage_msg(ctx.chat_id, "unsubscribe").await?;
        return Ok(());
    };

    match ctx.handler.storage.remove_subscription(ctx.chat_id, repository).await {
        Ok(()) => {
            tracing::info!("Chat {} unsubscribed from {repository}", ctx.chat_id);
            ctx.handler.messaging_service.send_unsubscribed_msg(ctx.chat_id, repository).await?;
        }
        Err(StorageError::NotFound { .. }) => {
            ctx.handler.messaging_service.send_not_subscribed_msg(ctx.chat_id, repository).await?;
        }
        Err(e) => {
            tracing::error!("Failed to unsubscribe chat {} from {repository}: {e}", ctx.chat_id);
            ctx.handler.messaging_service.send_error_msg(ctx.chat_id).await?;
        }
    }
    Ok(())
}
