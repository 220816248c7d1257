use serde::Deserialize;

/// Telegram update as delivered to the webhook. Only the fields the bot reads
/// are modelled and all of them are optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TelegramUpdate {
    pub update_id: Option<i64>,
    pub message: Option<TelegramMessage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TelegramMessage {
    pub chat: Option<TelegramChat>,
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TelegramChat {
    pub id: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InboundMessage {
    pub chat_id: i64,
    pub text: String,
}

impl TelegramUpdate {
    /// Messages without a chat cannot be answered and yield `None`.
    /// A missing text (stickers, photos) becomes an empty string.
    pub fn into_inbound(self) -> Option<InboundMessage> {
        let message = self.message?;
        let chat = message.chat?;
        Some(InboundMessage {
            chat_id: chat.id,
            text: message.text.unwrap_or_default(),
        })
    }
}
