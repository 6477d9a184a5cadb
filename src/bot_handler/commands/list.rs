use crate::bot_handler::{BotHandlerResult, commands::CommandContext};

pub async fn handle(ctx: CommandContext<'_>) -> BotHandlerResult<()> {
    let repositories = match ctx.handler.storage.repositories_of(ctx.chat_id).await {
        Ok(repositories) => repositories,
        Err(e) => {
            tracing::error!("Failed to list subscriptions for chat {}: {e}", ctx.chat_id);
            ctx.handler.messaging_service.send_error_msg(ctx.chat_id).await?;
            return Ok(());
        }
    };

    // Empty lists are rendered by the messaging service as "no subscriptions".
    ctx.handler
        .messaging_service
        .send_list_msg(ctx.chat_id, repositories.into_iter().collect())
        .await?;
    Ok(())
}
