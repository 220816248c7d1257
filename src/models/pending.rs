use chrono::NaiveDateTime;

use super::{ClientRecord, ExtractedIntent};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConversationState {
    Idle,
    AwaitingService,
}

impl ConversationState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConversationState::Idle => "idle",
            ConversationState::AwaitingService => "awaiting_service",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MissingField {
    Service,
}

impl MissingField {
    pub fn as_str(&self) -> &'static str {
        match self {
            MissingField::Service => "service",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "service" => Some(MissingField::Service),
            _ => None,
        }
    }
}

/// Partial billing command saved while the bot waits for one more answer.
#[derive(Debug, Clone)]
pub struct PendingRequest {
    pub id: String,
    pub chat_id: i64,
    pub partial_intent: ExtractedIntent,
    pub client: ClientRecord,
    pub missing_field: MissingField,
    pub created_at: NaiveDateTime,
    pub expires_at: NaiveDateTime,
}

impl PendingRequest {
    pub fn state(&self) -> ConversationState {
        match self.missing_field {
            MissingField::Service => ConversationState::AwaitingService,
        }
    }
}
