use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDate, Utc};

use crate::db::queries;
use crate::errors::BillingError;
use crate::models::{
    ConversationState, ExtractedIntent, InboundMessage, MissingField, PendingRequest,
};
use crate::services::ai::intent::extract_intent;
use crate::services::clients;
use crate::services::responder::{self, Reply};
use crate::state::AppState;

const TRIGGER_WORDS: [&str; 2] = ["рахунок", "акт"];
const CANCEL_WORDS: [&str; 3] = ["скасувати", "відміна", "/cancel"];

/// Billing flow starts only when the text mentions an invoice or an act.
pub fn is_trigger(text: &str) -> bool {
    let lowered = text.to_lowercase();
    TRIGGER_WORDS.iter().any(|w| lowered.contains(w))
}

fn is_cancel(text: &str) -> bool {
    let lowered = text.trim().to_lowercase();
    CANCEL_WORDS.iter().any(|w| lowered == *w)
}

/// Runs one inbound message through the state machine and sends its single reply.
/// The chat stays locked until the reply has been handed to the messaging provider,
/// so replies to one chat go out in the order the messages were processed.
pub async fn handle_message(state: &Arc<AppState>, inbound: &InboundMessage) -> Reply {
    let guard = state.chat_locks.acquire(inbound.chat_id).await;

    let reply = process_message(state, inbound, Utc::now()).await;
    responder::send(state.messaging.as_ref(), inbound.chat_id, &reply).await;

    drop(guard);
    reply
}

/// Decides the reply for a message. Callers must hold the chat lock.
/// Errors never escape: pending state is rolled back and an error reply is returned.
pub async fn process_message(
    state: &Arc<AppState>,
    inbound: &InboundMessage,
    now: DateTime<Utc>,
) -> Reply {
    match step(state, inbound, now).await {
        Ok(reply) => reply,
        Err(e) => {
            tracing::error!(error = %e, chat_id = inbound.chat_id, "billing flow failed");
            rollback(state, inbound.chat_id);
            Reply::Failed {
                message: e.user_message(),
            }
        }
    }
}

async fn step(
    state: &Arc<AppState>,
    inbound: &InboundMessage,
    now: DateTime<Utc>,
) -> Result<Reply, BillingError> {
    let chat_id = inbound.chat_id;
    let pending = {
        let db = state.db();
        queries::get_pending(&db, chat_id, &now.naive_utc()).map_err(BillingError::storage)?
    };
    let trigger = is_trigger(&inbound.text);

    let current = pending
        .as_ref()
        .map(|p| p.state())
        .unwrap_or(ConversationState::Idle);
    tracing::info!(chat_id, state = current.as_str(), trigger, "processing message");

    match pending {
        Some(pending) if !trigger => continue_pending(state, pending, &inbound.text),
        Some(stale) => {
            tracing::info!(chat_id, pending_id = %stale.id, "new request replaces pending one");
            discard(state, chat_id)?;
            start(state, inbound, now).await
        }
        None if trigger => start(state, inbound, now).await,
        None => Ok(Reply::UsageHint),
    }
}

/// IDLE + trigger: extract, resolve the client, then complete or ask for the service.
async fn start(
    state: &Arc<AppState>,
    inbound: &InboundMessage,
    now: DateTime<Utc>,
) -> Result<Reply, BillingError> {
    let today = local_today(state, now);
    let mut intent = extract_intent(state.llm.as_ref(), &inbound.text, today).await?;

    tracing::info!(
        chat_id = inbound.chat_id,
        client = %intent.client,
        amount = %intent.amount,
        has_service = intent.service.is_some(),
        "extracted billing intent"
    );

    let Some(client) = clients::resolve(state.sheets.as_ref(), &intent.client).await? else {
        return Ok(Reply::ClientNotFound {
            name: intent.client,
        });
    };

    if intent.service.is_none() {
        intent.service = clients::default_service(state.sheets.as_ref()).await?;
    }

    if intent.service.is_some() {
        return Ok(complete(inbound.chat_id, client.name, intent));
    }

    let created_at = now.naive_utc();
    let expires_at = Duration::try_minutes(state.config.pending_ttl_minutes)
        .and_then(|ttl| created_at.checked_add_signed(ttl))
        .ok_or_else(|| {
            BillingError::Storage(format!(
                "pending TTL of {} minutes is out of range",
                state.config.pending_ttl_minutes
            ))
        })?;
    let pending = PendingRequest {
        id: uuid::Uuid::new_v4().to_string(),
        chat_id: inbound.chat_id,
        partial_intent: intent,
        client,
        missing_field: MissingField::Service,
        created_at,
        expires_at,
    };
    {
        let db = state.db();
        queries::save_pending(&db, &pending).map_err(BillingError::storage)?;
    }
    tracing::info!(
        chat_id = inbound.chat_id,
        pending_id = %pending.id,
        state = pending.state().as_str(),
        "waiting for service name"
    );

    Ok(Reply::AskService)
}

/// AWAITING_SERVICE + any non-trigger text: the text itself is the service name.
fn continue_pending(
    state: &Arc<AppState>,
    pending: PendingRequest,
    text: &str,
) -> Result<Reply, BillingError> {
    let chat_id = pending.chat_id;
    let answer = text.trim();

    if is_cancel(answer) {
        discard(state, chat_id)?;
        tracing::info!(chat_id, pending_id = %pending.id, "pending request cancelled");
        return Ok(Reply::Cancelled);
    }

    if answer.is_empty() {
        return Ok(Reply::AskService);
    }

    let mut intent = pending.partial_intent;
    match pending.missing_field {
        MissingField::Service => intent.service = Some(answer.to_string()),
    }
    discard(state, chat_id)?;

    Ok(complete(chat_id, pending.client.name, intent))
}

fn complete(chat_id: i64, client_name: String, intent: ExtractedIntent) -> Reply {
    tracing::info!(
        chat_id,
        client = %client_name,
        amount = %intent.amount,
        service = intent.service.as_deref().unwrap_or(""),
        date = %intent.date,
        "billing command completed"
    );
    Reply::Completed {
        client_name,
        intent,
    }
}

fn discard(state: &Arc<AppState>, chat_id: i64) -> Result<(), BillingError> {
    let db = state.db();
    queries::delete_pending(&db, chat_id).map_err(BillingError::storage)?;
    Ok(())
}

fn rollback(state: &Arc<AppState>, chat_id: i64) {
    let db = state.db();
    if let Err(e) = queries::delete_pending(&db, chat_id) {
        tracing::error!(error = %e, chat_id, "failed to clear pending request");
    }
}

fn local_today(state: &AppState, now: DateTime<Utc>) -> NaiveDate {
    now.with_timezone(&state.config.local_offset()).date_naive()
}

/// Deletes pending requests whose clarification window has passed.
pub fn purge_expired(state: &AppState) {
    let db = state.db();
    match queries::expire_old_pending(&db, &Utc::now().naive_utc()) {
        Ok(0) => {}
        Ok(count) => tracing::info!(count, "expired pending requests"),
        Err(e) => tracing::error!(error = %e, "failed to expire pending requests"),
    }
}
