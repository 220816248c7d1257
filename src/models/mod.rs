pub mod client;
pub mod inbound;
pub mod intent;
pub mod pending;

pub use client::ClientRecord;
pub use inbound::{InboundMessage, TelegramUpdate};
pub use intent::{ExtractedIntent, RawIntentPayload};
pub use pending::{ConversationState, MissingField, PendingRequest};
