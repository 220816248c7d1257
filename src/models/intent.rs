use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Billing command extracted from a free-text request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExtractedIntent {
    pub client: String,
    pub amount: Decimal,
    pub amount_in_words: String,
    pub date: String,
    pub service: Option<String>,
}

/// Flat object the model is asked to produce. Every key is optional here;
/// validation decides what is required.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawIntentPayload {
    #[serde(default)]
    pub client: Option<String>,
    #[serde(default)]
    pub amount: Option<serde_json::Value>,
    #[serde(default)]
    pub amount_words: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub service: Option<String>,
}
