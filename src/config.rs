use std::{
    env::{self, VarError},
    str::FromStr,
};

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_DATABASE_URL: &str = "sqlite:data/gitgram.db";
const DEFAULT_MAX_CONCURRENCY: usize = 10;

/// Where subscriptions are kept.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StorageBackend {
    /// SQLite database at [`Config::database_url`]; survives restarts.
    #[default]
    Sqlite,
    /// Process memory; every subscription is lost on restart.
    Memory,
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sqlite" => Ok(Self::Sqlite),
            "memory" => Ok(Self::Memory),
            other => Err(format!("unknown storage backend '{other}'")),
        }
    }
}

/// Represents the application configuration.
#[derive(Debug)]
pub struct Config {
    /// The Telegram bot token.
    pub telegram_bot_token: String,
    /// The port the webhook server listens on.
    pub port: u16,
    /// The subscription storage backend.
    pub storage_backend: StorageBackend,
    /// The URL of the database.
    pub database_url: String,
    /// The maximum number of notifications sent concurrently for one push.
    pub max_concurrency: usize,
    /// Public base URL of the webhook server, used in the subscribe hint.
    pub public_url: Option<String>,
    /// Whether diagnostic endpoints are routed.
    pub debug_endpoints: bool,
}

impl Config {
    /// Creates a new `Config` instance from environment variables.
    ///
    /// The bot token is read from `TELOXIDE_TOKEN`, falling back to
    /// `TELEGRAM_TOKEN`. A missing or empty token is an error.
    pub fn from_env() -> Result<Self, VarError> {
        Ok(Self {
            telegram_bot_token: non_empty_var("TELOXIDE_TOKEN")
                .or_else(|_| non_empty_var("TELEGRAM_TOKEN"))?,
            port: env::var("PORT").ok().and_then(|v| v.parse().ok()).unwrap_or(DEFAULT_PORT),
            storage_backend: env::var("STORAGE_BACKEND")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or_default(),
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string()),
            max_concurrency: env::var("MAX_CONCURRENCY")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|&v| v > 0)
                .unwrap_or(DEFAULT_MAX_CONCURRENCY),
            public_url: non_empty_var("PUBLIC_URL").ok(),
            debug_endpoints: env::var("DEBUG_ENDPOINTS")
                .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
                .unwrap_or(false),
        })
    }
}

fn non_empty_var(key: &str) -> Result<String, VarError> {
    match env::var(key) {
        Ok(value) if value.trim().is_empty() => Err(VarError::NotPresent),
        other => other,
    }
}
