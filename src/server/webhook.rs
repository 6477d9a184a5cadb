//! Webhook endpoint handler.
//!
//! Parses a GitHub push event and relays it to the repository's subscribers
//! before answering, so the response carries the delivery counts.

use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use super::AppState;
use crate::{
    github::PushEvent,
    notifier::{DeliveryReport, NotifierError},
    storage::StorageError,
};

/// Header name for GitHub event type.
const HEADER_EVENT: &str = "x-github-event";

/// Errors that can occur when processing a webhook.
#[derive(Debug, Error)]
pub enum WebhookError {
    /// Invalid JSON body.
    #[error("Invalid payload format: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// Missing repository name in payload.
    #[error("Repository name is missing")]
    MissingRepository,

    /// Subscriber lookup failed.
    #[error("Failed to look up subscribers: {0}")]
    Storage(#[from] StorageError),
}

impl From<NotifierError> for WebhookError {
    fn from(err: NotifierError) -> Self {
        match err {
            NotifierError::MissingRepository => WebhookError::MissingRepository,
            NotifierError::Storage(e) => WebhookError::Storage(e),
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for WebhookError {
    fn into_response(self) -> Response {
        let status = match &self {
            WebhookError::InvalidJson(_) | WebhookError::MissingRepository => {
                StatusCode::BAD_REQUEST
            }
            WebhookError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, Json(ErrorBody { error: self.to_string() })).into_response()
    }
}

/// Body of a successful webhook response.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct WebhookResponse {
    /// Short human-readable outcome.
    pub message: &'static str,
    /// Chats subscribed to the pushed repository.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscribers: Option<usize>,
    /// Chats the notification reached.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notifications_sent: Option<usize>,
}

impl WebhookResponse {
    fn message(message: &'static str) -> Self {
        Self { message, subscribers: None, notifications_sent: None }
    }

    fn delivered(report: DeliveryReport) -> Self {
        let message = if report.subscribers == 0 { "No subscribers" } else { "Webhook processed" };
        Self {
            message,
            subscribers: Some(report.subscribers),
            notifications_sent: Some(report.delivered),
        }
    }
}

/// Webhook handler.
///
/// # Response
///
/// - 200 OK: push relayed (or nobody subscribed), ping answered, or a
///   non-push event ignored
/// - 400 Bad Request: invalid JSON or missing `repository.full_name`
/// - 500 Internal Server Error: subscriber lookup failed
pub async fn webhook_handler(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<WebhookResponse>, WebhookError> {
    // Deliveries without the header are treated as push events.
    let event_type = headers.get(HEADER_EVENT).and_then(|v| v.to_str().ok()).unwrap_or("push");

    match event_type {
        "push" => {}
        "ping" => {
            tracing::info!("Received webhook ping");
            return Ok(Json(WebhookResponse::message("pong")));
        }
        other => {
            tracing::debug!(event_type = %other, "Ignoring non-push webhook event");
            return Ok(Json(WebhookResponse::message("Event ignored")));
        }
    }

    let event: PushEvent = serde_json::from_slice(&body).inspect_err(|e| {
        tracing::warn!(error = %e, "Error parsing webhook payload");
    })?;

    tracing::info!(
        repository = %event.repository.full_name,
        commits = event.commits.len(),
        "Received push event"
    );

    let report = app_state.notifier().notify(&event).await.inspect_err(|e| match e {
        NotifierError::MissingRepository => tracing::warn!("Push event without repository name"),
        NotifierError::Storage(e) => tracing::error!(error = %e, "Failed to resolve subscribers"),
    })?;

    Ok(Json(WebhookResponse::delivered(report)))
}
