use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::models::TelegramUpdate;
use crate::services::conversation;
use crate::state::AppState;

const SECRET_HEADER: &str = "x-telegram-bot-api-secret-token";

/// Telegram webhook. Anything that gets past the secret check is answered with
/// `{"ok": true}`; processing problems are reported in the chat instead.
pub async fn telegram_webhook(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    // Secret check is skipped when no secret is configured (dev mode)
    if !state.config.telegram_webhook_secret.is_empty() {
        let provided = headers
            .get(SECRET_HEADER)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");

        if provided != state.config.telegram_webhook_secret {
            tracing::warn!("invalid or missing Telegram secret token");
            return (StatusCode::FORBIDDEN, "Invalid secret token").into_response();
        }
    }

    let update: TelegramUpdate = match serde_json::from_slice(&body) {
        Ok(update) => update,
        Err(e) => {
            tracing::warn!(error = %e, "unparseable webhook body, ignoring");
            return ok_response();
        }
    };

    if let Some(update_id) = update.update_id {
        let fresh = state
            .recent_updates
            .lock()
            .map(|mut recent| recent.insert(update_id))
            .unwrap_or(true);
        if !fresh {
            tracing::info!(update_id, "duplicate update, ignoring");
            return ok_response();
        }
    }

    let Some(inbound) = update.into_inbound() else {
        tracing::debug!("update without a chat message, ignoring");
        return ok_response();
    };

    tracing::info!(chat_id = inbound.chat_id, text = %inbound.text, "incoming message");

    let reply = conversation::handle_message(&state, &inbound).await;
    tracing::debug!(chat_id = inbound.chat_id, kind = reply.kind(), "reply sent");

    conversation::purge_expired(&state);
    state.chat_locks.prune();

    ok_response()
}

fn ok_response() -> Response {
    Json(serde_json::json!({ "ok": true })).into_response()
}
