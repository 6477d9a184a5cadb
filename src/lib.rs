#![warn(missing_docs)]
//! A Telegram bot relaying GitHub push events.
//!
//! Chats subscribe to repositories with `/subscribe owner/repo`. GitHub
//! delivers push webhooks to the bot's HTTP server, and every subscribed chat
//! receives a summary of the pushed commits.

/// The main handler for the bot's chat commands.
pub mod bot_handler;
/// The configuration for the application.
pub mod config;
/// The dispatcher for routing Telegram updates to the correct handlers.
pub mod dispatcher;
/// GitHub webhook payload types.
pub mod github;
/// The service for sending messages to chats.
pub mod messaging;
/// Rendering of push notifications.
pub mod notification;
/// Fan-out of push events to subscribers.
pub mod notifier;
/// The HTTP server receiving webhooks.
pub mod server;
/// The subscription registry.
pub mod storage;

use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use teloxide::prelude::*;

use crate::{
    bot_handler::BotHandler,
    config::{Config, StorageBackend},
    messaging::TelegramMessagingService,
    notifier::PushNotifier,
    server::AppState,
    storage::{InMemoryStorage, SubscriptionStorage, sqlite::SqliteStorage},
};

/// Runs the bot.
///
/// Everything that can fail at startup (configuration, storage, binding the
/// HTTP port) is done before any traffic is served.
pub async fn run() -> anyhow::Result<()> {
    let config = Config::from_env().context("TELOXIDE_TOKEN environment variable is required")?;
    let storage = open_storage(&config).await?;
    let bot = Bot::new(config.telegram_bot_token.clone());

    let messaging_service =
        Arc::new(TelegramMessagingService::new(bot.clone(), config.public_url.clone()));

    let notifier = PushNotifier::new(storage.clone(), messaging_service.clone(), config.max_concurrency);
    let router =
        server::build_router(AppState::new(notifier, storage.clone()), config.debug_endpoints);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind HTTP server to {addr}"))?;
    tracing::info!("Server started at {addr}");

    // Spawn the webhook server.
    tokio::spawn(async move {
        if let Err(e) = server::serve(listener, router).await {
            tracing::error!("Error in webhook server: {e}");
        }
    });

    let handler = Arc::new(BotHandler::new(messaging_service, storage));
    let mut dispatcher = dispatcher::BotDispatcher::new(handler).build(bot);
    tracing::debug!("Dispatcher built successfully.");

    dispatcher.dispatch().await;

    Ok(())
}

async fn open_storage(config: &Config) -> anyhow::Result<Arc<dyn SubscriptionStorage>> {
    match config.storage_backend {
        StorageBackend::Sqlite => {
            let storage = SqliteStorage::new(&config.database_url)
                .await
                .with_context(|| format!("Failed to open database {}", config.database_url))?;
            tracing::info!("Using SQLite subscription storage");
            Ok(Arc::new(storage))
        }
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory subscription storage; subscriptions are lost on restart");
            Ok(Arc::new(InMemoryStorage::new()))
        }
    }
}
