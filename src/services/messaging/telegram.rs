use anyhow::Context;
use async_trait::async_trait;
use serde_json::json;

use super::MessagingProvider;

pub struct TelegramBotProvider {
    token: String,
    client: reqwest::Client,
}

impl TelegramBotProvider {
    pub fn new(token: String) -> Self {
        Self {
            token,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl MessagingProvider for TelegramBotProvider {
    async fn send_message(&self, chat_id: i64, text: &str) -> anyhow::Result<()> {
        // The token is part of the URL, so it is stripped from any error.
        let url = format!("https://api.telegram.org/bot{}/sendMessage", self.token);

        self.client
            .post(&url)
            .json(&json!({
                "chat_id": chat_id,
                "text": text,
            }))
            .send()
            .await
            .map_err(reqwest::Error::without_url)
            .context("failed to call Telegram sendMessage")?
            .error_for_status()
            .map_err(reqwest::Error::without_url)
            .context("Telegram API returned error")?;

        Ok(())
    }
}
