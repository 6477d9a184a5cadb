//! HTTP server receiving GitHub webhooks.
//!
//! # Endpoints
//!
//! - `POST /webhook` - Relays a push event to the repository's subscribers
//! - `GET /health`, `GET /` - Returns 200 while the server is running
//! - `GET /subscriptions` - Dumps the registry (only with `DEBUG_ENDPOINTS`)

use std::{collections::BTreeMap, sync::Arc};

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};

/// Health check endpoint.
pub mod health;
/// Webhook endpoint.
pub mod webhook;

pub use health::health_handler;
pub use webhook::webhook_handler;

use crate::{notifier::PushNotifier, storage::SubscriptionStorage};

/// Shared application state, passed to handlers via axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    notifier: PushNotifier,
    storage: Arc<dyn SubscriptionStorage>,
}

impl AppState {
    /// Creates the state shared by every handler.
    pub fn new(notifier: PushNotifier, storage: Arc<dyn SubscriptionStorage>) -> Self {
        Self { notifier, storage }
    }

    /// The notifier relaying push events.
    pub fn notifier(&self) -> &PushNotifier {
        &self.notifier
    }
}

/// Builds the axum Router with all endpoints.
pub fn build_router(app_state: AppState, debug_endpoints: bool) -> Router {
    let mut router = Router::new()
        .route("/webhook", post(webhook_handler))
        .route("/health", get(health_handler))
        .route("/", get(health_handler));

    if debug_endpoints {
        router = router.route("/subscriptions", get(subscriptions_handler));
    }

    router.with_state(app_state)
}

/// Serves the router on an already bound listener until the process exits.
pub async fn serve(listener: tokio::net::TcpListener, router: Router) -> std::io::Result<()> {
    axum::serve(listener, router).await
}

/// Returns every subscription as `{repository: [chat_id, ...]}`, sorted.
async fn subscriptions_handler(
    State(app_state): State<AppState>,
) -> Result<Json<BTreeMap<String, Vec<i64>>>, (StatusCode, String)> {
    let all = app_state.storage.all_subscriptions().await.map_err(|e| {
        tracing::error!("Failed to dump subscriptions: {e}");
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    })?;

    let dump = all
        .into_iter()
        .map(|(repo, chats)| {
            let mut chat_ids: Vec<i64> = chats.into_iter().map(|chat| chat.0).collect();
            chat_ids.sort_unstable();
            (repo, chat_ids)
        })
        .collect();

    Ok(Json(dump))
}
