//! Webhook server: receives Telegram updates over HTTP and feeds messages to the handler chain.
//!
//! `POST {path}` answers as soon as the update is accepted; the chain runs in a spawned task per
//! message, so a slow greeting never holds the HTTP response (Telegram retries on timeouts).

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use greet_core::ToCoreMessage;
use serde_json::{json, Value};
use teloxide::types::{Update, UpdateKind};
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info, warn};

use super::adapters::TelegramMessageWrapper;
use crate::chain::HandlerChain;

/// Header Telegram sets to the `secret_token` given in setWebhook.
pub const SECRET_TOKEN_HEADER: &str = "x-telegram-bot-api-secret-token";

#[derive(Clone)]
pub struct WebhookState {
    pub chain: HandlerChain,
    /// When set, requests without a matching secret header are rejected with 401.
    pub secret: Option<String>,
}

impl WebhookState {
    pub fn new(chain: HandlerChain, secret: Option<String>) -> Self {
        Self { chain, secret }
    }
}

/// Builds the router: `POST {path}` for updates, `GET /health` for probes.
pub fn router(state: WebhookState, path: &str) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route(path, post(update_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_handler() -> Json<Value> {
    Json(json!({ "status": "healthy" }))
}

fn is_secret_token_valid(expected: Option<&str>, headers: &HeaderMap) -> bool {
    match expected {
        None => true,
        Some(expected) => headers
            .get(SECRET_TOKEN_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(|got| got == expected)
            .unwrap_or(false),
    }
}

async fn update_handler(
    State(state): State<WebhookState>,
    headers: HeaderMap,
    body: Result<Json<Update>, JsonRejection>,
) -> (StatusCode, &'static str) {
    if !is_secret_token_valid(state.secret.as_deref(), &headers) {
        warn!("Webhook request rejected: wrong secret token");
        return (StatusCode::UNAUTHORIZED, "Wrong secret token");
    }

    let update = match body {
        Ok(Json(update)) => update,
        Err(e) => {
            warn!(error = %e, "Webhook request rejected: invalid update JSON");
            return (StatusCode::BAD_REQUEST, "Invalid JSON");
        }
    };

    let msg = match update.kind {
        UpdateKind::Message(msg) => msg,
        _ => {
            debug!(update_id = ?update.id, "Ignoring non-message update");
            return (StatusCode::OK, "Ignored");
        }
    };

    let core_msg = TelegramMessageWrapper(&msg).to_core();
    match msg.text() {
        Some(text) => info!(
            user_id = core_msg.user.id,
            chat_id = core_msg.chat.id,
            message_content = %text,
            "Received message"
        ),
        None => info!(
            user_id = core_msg.user.id,
            chat_id = core_msg.chat.id,
            "Received non-text message"
        ),
    }

    let chain = state.chain.clone();
    tokio::spawn(async move {
        info!(
            user_id = core_msg.user.id,
            chat_id = core_msg.chat.id,
            message_id = %core_msg.id,
            "step: processing message (handler chain started)"
        );
        if let Err(e) = chain.handle(&core_msg).await {
            error!(error = %e, user_id = core_msg.user.id, "Handler chain failed");
        }
    });

    (StatusCode::OK, "Ok")
}
