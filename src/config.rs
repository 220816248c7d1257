use std::env;
use std::ops::RangeInclusive;

use chrono::{FixedOffset, Offset, Utc};

// One week at most.
const PENDING_TTL_RANGE_MINUTES: RangeInclusive<i64> = 1..=10_080;
// Real-world offsets stay within ±14 hours.
const UTC_OFFSET_RANGE_MINUTES: RangeInclusive<i32> = -14 * 60..=14 * 60;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub port: u16,
    pub database_url: String,
    pub admin_token: String,
    pub telegram_token: String,
    pub telegram_webhook_secret: String,
    pub openai_api_key: String,
    pub openai_model: String,
    pub openai_base_url: String,
    pub google_sheets_id: String,
    pub google_service_account_json: String,
    pub pending_ttl_minutes: i64,
    pub utc_offset_minutes: i32,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),
            database_url: env::var("DATABASE_URL").unwrap_or_else(|_| "billing.db".to_string()),
            admin_token: env::var("ADMIN_TOKEN").unwrap_or_default(),
            telegram_token: env::var("TELEGRAM_TOKEN").unwrap_or_default(),
            telegram_webhook_secret: env::var("TELEGRAM_WEBHOOK_SECRET").unwrap_or_default(),
            openai_api_key: env::var("OPENAI_API_KEY").unwrap_or_default(),
            openai_model: env::var("OPENAI_MODEL")
                .unwrap_or_else(|_| "gpt-3.5-turbo".to_string()),
            openai_base_url: env::var("OPENAI_BASE_URL")
                .unwrap_or_else(|_| "https://api.openai.com/v1".to_string()),
            google_sheets_id: env::var("GOOGLE_SHEETS_ID").unwrap_or_default(),
            google_service_account_json: env::var("GOOGLE_SERVICE_ACCOUNT_JSON")
                .unwrap_or_default(),
            pending_ttl_minutes: env::var("PENDING_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|m: &i64| PENDING_TTL_RANGE_MINUTES.contains(m))
                .unwrap_or(15),
            utc_offset_minutes: env::var("UTC_OFFSET_MINUTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|m: &i32| UTC_OFFSET_RANGE_MINUTES.contains(m))
                .unwrap_or(120),
        }
    }

    /// Offset used to decide what "today" means for the people writing to the bot.
    pub fn local_offset(&self) -> FixedOffset {
        self.utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .unwrap_or_else(|| Utc.fix())
    }
}
