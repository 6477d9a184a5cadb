use teloxide::Bot;

use super::TelegramMessagingService;

fn service(public_url: Option<&str>) -> TelegramMessagingService {
    TelegramMessagingService::new(Bot::new("test-token"), public_url.map(String::from))
}

#[test]
fn test_list_text_is_sorted_and_numbered() {
    let repos = vec!["rust-lang/rust".to_string(), "octocat/Hello-World".to_string()];

    let text = TelegramMessagingService::list_text(repos);

    assert!(text.contains("1. octocat/Hello-World\n2. rust-lang/rust"));
    assert!(text.contains("/unsubscribe"));
}

#[test]
fn test_list_text_empty() {
    let text = TelegramMessagingService::list_text(vec![]);
    assert!(text.starts_with("You have no active subscriptions."));
}

#[test]
fn test_usage_text_names_command() {
    let text = TelegramMessagingService::usage_text("subscribe");

    assert!(text.starts_with("Usage: /subscribe &lt;owner/repo&gt;"));
    assert!(text.ends_with("Example: /subscribe octocat/Hello-World"));
}

#[test]
fn test_subscribed_text_uses_public_url() {
    let text = service(Some("https://bot.example.com/")).subscribed_text("octocat/Hello-World");

    assert!(text.contains("<b>octocat/Hello-World</b>"));
    assert!(text.contains("<code>https://bot.example.com/webhook</code>"));
}

#[test]
fn test_subscribed_text_without_public_url() {
    let text = service(None).subscribed_text("octocat/Hello-World");
    assert!(text.contains("<code>&lt;your-server-url&gt;/webhook</code>"));
}

#[test]
fn test_help_text_lists_commands() {
    let text = TelegramMessagingService::help_text();

    for command in ["/start", "/help", "/subscribe", "/unsubscribe", "/list"] {
        assert!(text.contains(command), "help text is missing {command}");
    }
}
