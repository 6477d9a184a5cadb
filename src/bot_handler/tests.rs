use std::{collections::HashSet, sync::Arc};

use mockall::predicate::*;
use teloxide::types::ChatId;

use crate::{
    bot_handler::{BotHandler, BotHandlerError, Command, is_unknown_command, parse_repository_arg},
    messaging::MockMessagingService,
    storage::{InMemoryStorage, MockSubscriptionStorage, StorageError, SubscriptionStorage},
};

const CHAT_ID: ChatId = ChatId(123);
const REPO: &str = "octocat/Hello-World";

fn handler(messaging: MockMessagingService, storage: MockSubscriptionStorage) -> BotHandler {
    BotHandler::new(Arc::new(messaging), Arc::new(storage))
}

#[test]
fn test_parse_repository_arg() {
    assert_eq!(parse_repository_arg("octocat/Hello-World").unwrap(), REPO);
    assert_eq!(parse_repository_arg("  octocat/Hello-World \n").unwrap(), REPO);
    assert!(matches!(parse_repository_arg(""), Err(BotHandlerError::InvalidInput(_))));
    assert!(matches!(parse_repository_arg("   "), Err(BotHandlerError::InvalidInput(_))));
    assert!(matches!(parse_repository_arg("bad-format"), Err(BotHandlerError::InvalidInput(_))));
    assert!(matches!(parse_repository_arg("a/b c/d"), Err(BotHandlerError::InvalidInput(_))));
}

#[test]
fn test_parse_command_arguments() {
    use teloxide::utils::command::BotCommands;

    assert_eq!(
        Command::parse("/subscribe octocat/Hello-World", "gitgram_bot").unwrap(),
        Command::Subscribe(REPO.to_string())
    );
    assert_eq!(Command::parse("/list", "gitgram_bot").unwrap(), Command::List);
    assert!(Command::parse("/list_subscriptions", "gitgram_bot").is_err());
}

#[test]
fn test_is_unknown_command() {
    const BOT: &str = "gitgram_bot";

    assert!(is_unknown_command("/frobnicate", BOT));
    assert!(is_unknown_command("/frobnicate@gitgram_bot", BOT));

    // Known commands are routed to their handlers instead.
    assert!(!is_unknown_command("/list", BOT));
    assert!(!is_unknown_command("/subscribe@gitgram_bot octocat/Hello-World", BOT));

    // Free text is ignored.
    assert!(!is_unknown_command("hello there", BOT));
    assert!(!is_unknown_command("octocat/Hello-World", BOT));
    assert!(!is_unknown_command("", BOT));

    // Commands addressed to other bots in a shared chat are not ours to answer.
    assert!(!is_unknown_command("/subscribe@otherbot a/b", BOT));
    assert!(!is_unknown_command("/frobnicate@otherbot", BOT));
}

#[tokio::test]
async fn test_unknown_command_sends_notice() {
    let mut mock_messaging = MockMessagingService::new();
    mock_messaging
        .expect_send_unknown_command_msg()
        .with(eq(CHAT_ID))
        .times(1)
        .returning(|_| Ok(()));

    let result = handler(mock_messaging, MockSubscriptionStorage::new())
        .handle_unknown_command(CHAT_ID, "/frobnicate")
        .await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_subscribe_success() {
    let mut mock_messaging = MockMessagingService::new();
    let mut mock_storage = MockSubscriptionStorage::new();

    mock_storage
        .expect_add_subscription()
        .with(eq(CHAT_ID), eq(REPO))
        .times(1)
        .returning(|_, _| Ok(()));
    mock_messaging
        .expect_send_subscribed_msg()
        .with(eq(CHAT_ID), eq(REPO))
        .times(1)
        .returning(|_, _| Ok(()));

    let result = handler(mock_messaging, mock_storage)
        .handle_command(CHAT_ID, Command::Subscribe(REPO.to_string()))
        .await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_subscribe_already_subscribed() {
    let mut mock_messaging = MockMessagingService::new();
    let mut mock_storage = MockSubscriptionStorage::new();

    mock_storage.expect_add_subscription().returning(|chat_id, repo| {
        Err(StorageError::AlreadyExists { chat_id, repository: repo.to_string() })
    });
    mock_messaging
        .expect_send_already_subscribed_msg()
        .with(eq(CHAT_ID), eq(REPO))
        .times(1)
        .returning(|_, _| Ok(()));

    let result = handler(mock_messaging, mock_storage)
        .handle_command(CHAT_ID, Command::Subscribe(REPO.to_string()))
        .await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_subscribe_storage_failure_asks_to_retry() {
    let mut mock_messaging = MockMessagingService::new();
    let mut mock_storage = MockSubscriptionStorage::new();

    mock_storage
        .expect_add_subscription()
        .returning(|_, _| Err(StorageError::DbError("database is locked".to_string())));
    mock_messaging.expect_send_error_msg().with(eq(CHAT_ID)).times(1).returning(|_| Ok(()));

    let result = handler(mock_messaging, mock_storage)
        .handle_command(CHAT_ID, Command::Subscribe(REPO.to_string()))
        .await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_subscribe_bad_format_does_not_touch_storage() {
    let mut mock_messaging = MockMessagingService::new();
    // No expectations: any storage call fails the test.
    let mock_storage = MockSubscriptionStorage::new();

    mock_messaging
        .expect_send_usage_msg()
        .with(eq(CHAT_ID), eq("subscribe"))
        .times(1)
        .returning(|_, _| Ok(()));

    let result = handler(mock_messaging, mock_storage)
        .handle_command(CHAT_ID, Command::Subscribe("bad-format".to_string()))
        .await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_subscribe_bad_format_leaves_registry_empty() {
    let storage = Arc::new(InMemoryStorage::new());
    let mut mock_messaging = MockMessagingService::new();
    mock_messaging.expect_send_usage_msg().times(1).returning(|_, _| Ok(()));

    let handler = BotHandler::new(Arc::new(mock_messaging), storage.clone());
    handler.handle_command(CHAT_ID, Command::Subscribe("bad-format".to_string())).await.unwrap();

    assert!(storage.all_subscriptions().await.unwrap().is_empty());
    assert!(storage.repositories_of(CHAT_ID).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_unsubscribe_success() {
    let mut mock_messaging = MockMessagingService::new();
    let mut mock_storage = MockSubscriptionStorage::new();

    mock_storage
        .expect_remove_subscription()
        .with(eq(CHAT_ID), eq(REPO))
        .times(1)
        .returning(|_, _| Ok(()));
    mock_messaging
        .expect_send_unsubscribed_msg()
        .with(eq(CHAT_ID), eq(REPO))
        .times(1)
        .returning(|_, _| Ok(()));

    let result = handler(mock_messaging, mock_storage)
        .handle_command(CHAT_ID, Command::Unsubscribe(REPO.to_string()))
        .await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_unsubscribe_not_subscribed() {
    let mut mock_messaging = MockMessagingService::new();
    let mut mock_storage = MockSubscriptionStorage::new();

    mock_storage.expect_remove_subscription().returning(|chat_id, repo| {
        Err(StorageError::NotFound { chat_id, repository: repo.to_string() })
    });
    mock_messaging
        .expect_send_not_subscribed_msg()
        .with(eq(CHAT_ID), eq(REPO))
        .times(1)
        .returning(|_, _| Ok(()));

    let result = handler(mock_messaging, mock_storage)
        .handle_command(CHAT_ID, Command::Unsubscribe(REPO.to_string()))
        .await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_unsubscribe_missing_argument() {
    let mut mock_messaging = MockMessagingService::new();
    mock_messaging
        .expect_send_usage_msg()
        .with(eq(CHAT_ID), eq("unsubscribe"))
        .times(1)
        .returning(|_, _| Ok(()));

    let result = handler(mock_messaging, MockSubscriptionStorage::new())
        .handle_command(CHAT_ID, Command::Unsubscribe(String::new()))
        .await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_list_sends_repositories() {
    let mut mock_messaging = MockMessagingService::new();
    let mut mock_storage = MockSubscriptionStorage::new();

    mock_storage
        .expect_repositories_of()
        .with(eq(CHAT_ID))
        .returning(|_| Ok(HashSet::from([REPO.to_string(), "rust-lang/rust".to_string()])));
    mock_messaging
        .expect_send_list_msg()
        .withf(|chat_id, repos| {
            *chat_id == CHAT_ID && repos.len() == 2 && repos.contains(&REPO.to_string())
        })
        .times(1)
        .returning(|_, _| Ok(()));

    let result = handler(mock_messaging, mock_storage).handle_command(CHAT_ID, Command::List).await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_list_empty() {
    let mut mock_messaging = MockMessagingService::new();
    let mut mock_storage = MockSubscriptionStorage::new();

    mock_storage.expect_repositories_of().returning(|_| Ok(HashSet::new()));
    mock_messaging
        .expect_send_list_msg()
        .withf(|chat_id, repos| *chat_id == CHAT_ID && repos.is_empty())
        .times(1)
        .returning(|_, _| Ok(()));

    let result = handler(mock_messaging, mock_storage).handle_command(CHAT_ID, Command::List).await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_start_and_help() {
    let mut mock_messaging = MockMessagingService::new();
    mock_messaging.expect_send_start_msg().with(eq(CHAT_ID)).times(1).returning(|_| Ok(()));
    mock_messaging.expect_send_help_msg().with(eq(CHAT_ID)).times(1).returning(|_| Ok(()));

    let handler = handler(mock_messaging, MockSubscriptionStorage::new());

    assert!(handler.handle_command(CHAT_ID, Command::Start).await.is_ok());
    assert!(handler.handle_command(CHAT_ID, Command::Help).await.is_ok());
}

#[tokio::test]
async fn test_subscribe_then_list_through_registry() {
    let storage = Arc::new(InMemoryStorage::new());
    let mut mock_messaging = MockMessagingService::new();
    mock_messaging.expect_send_subscribed_msg().times(1).returning(|_, _| Ok(()));
    mock_messaging.expect_send_already_subscribed_msg().times(1).returning(|_, _| Ok(()));
    mock_messaging
        .expect_send_list_msg()
        .withf(|_, repos| repos == &vec![REPO.to_string()])
        .times(1)
        .returning(|_, _| Ok(()));

    let handler = BotHandler::new(Arc::new(mock_messaging), storage.clone());
    handler.handle_command(CHAT_ID, Command::Subscribe(REPO.to_string())).await.unwrap();
    handler.handle_command(CHAT_ID, Command::Subscribe(REPO.to_string())).await.unwrap();
    handler.handle_command(CHAT_ID, Command::List).await.unwrap();

    assert!(storage.contains(CHAT_ID, REPO).await.unwrap());
}
