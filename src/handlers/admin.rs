use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::Json;
use chrono::Utc;
use serde::Serialize;

use crate::db::queries;
use crate::errors::AppError;
use crate::models::PendingRequest;
use crate::state::AppState;

/// Bearer-token check. An empty configured token disables the admin API.
fn check_auth(headers: &HeaderMap, expected_token: &str) -> Result<(), AppError> {
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    let token = auth.strip_prefix("Bearer ").unwrap_or("");
    if expected_token.is_empty() || token != expected_token {
        return Err(AppError::Unauthorized);
    }
    Ok(())
}

#[derive(Serialize)]
pub struct PendingView {
    id: String,
    chat_id: i64,
    state: &'static str,
    client: String,
    amount: String,
    amount_in_words: String,
    date: String,
    missing_field: &'static str,
    created_at: String,
    expires_at: String,
}

impl From<PendingRequest> for PendingView {
    fn from(p: PendingRequest) -> Self {
        Self {
            state: p.state().as_str(),
            missing_field: p.missing_field.as_str(),
            id: p.id,
            chat_id: p.chat_id,
            client: p.client.name,
            amount: p.partial_intent.amount.to_string(),
            amount_in_words: p.partial_intent.amount_in_words,
            date: p.partial_intent.date,
            created_at: p.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            expires_at: p.expires_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}

// GET /api/admin/pending
pub async fn list_pending(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<PendingView>>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    let pending = {
        let db = state.db();
        queries::list_pending(&db, &Utc::now().naive_utc())?
    };

    Ok(Json(pending.into_iter().map(PendingView::from).collect()))
}

// POST /api/admin/pending/:chat_id/cancel
pub async fn cancel_pending(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(chat_id): Path<i64>,
) -> Result<Json<serde_json::Value>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    let _guard = state.chat_locks.acquire(chat_id).await;
    let removed = {
        let db = state.db();
        queries::delete_pending(&db, chat_id)?
    };

    if !removed {
        return Err(AppError::NotFound(format!("no pending request for chat {chat_id}")));
    }

    tracing::info!(chat_id, "pending request cancelled by admin");
    Ok(Json(serde_json::json!({ "success": true })))
}
