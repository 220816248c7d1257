use std::str::FromStr;

use chrono::{Duration, NaiveDate};
use rust_decimal::Decimal;

use crate::errors::BillingError;
use crate::models::{ExtractedIntent, RawIntentPayload};
use crate::services::ai::{LlmProvider, Message};
use crate::services::locale;

const SYSTEM_PROMPT: &str = "Ти фінансовий асистент.";

/// Instruction sent as the user turn. The request text is quoted verbatim at the end.
pub fn build_prompt(text: &str, today: NaiveDate) -> String {
    let today_long = locale::format_long_date(today);
    let tomorrow_long = locale::format_long_date(today + Duration::days(1));
    let yesterday_long = locale::format_long_date(today - Duration::days(1));

    format!(
        r#"Ти — фінансовий асистент, що готує рахунки та акти виконаних робіт.
Проаналізуй український текст і поверни ЛИШЕ JSON-об'єкт такого вигляду:
{{
  "client": "назва клієнта",
  "amount": 0,
  "amount_words": "сума прописом",
  "date": "дата документа",
  "service": "найменування послуги"
}}
Правила:
- "amount" — число без валюти.
- "amount_words" — сума прописом українською, у гривнях.
- Дата: якщо "сьогодні" — пиши "{today_long}", якщо "завтра" — "{tomorrow_long}", якщо "вчора" — "{yesterday_long}". Інші дати — у тому ж форматі.
- Якщо послуга не вказана — залиш поле "service" пустим.
Текст: """{text}""""#
    )
}

/// Sends the request text to the model and turns its reply into a validated intent.
pub async fn extract_intent(
    llm: &dyn LlmProvider,
    text: &str,
    today: NaiveDate,
) -> Result<ExtractedIntent, BillingError> {
    let messages = [Message {
        role: "user".to_string(),
        content: build_prompt(text, today),
    }];

    let response = llm
        .chat(SYSTEM_PROMPT, &messages)
        .await
        .map_err(BillingError::transport)?;

    parse_intent_response(&response, today)
}

/// Decodes the first balanced `{...}` in the model reply and validates it.
pub fn parse_intent_response(
    response: &str,
    today: NaiveDate,
) -> Result<ExtractedIntent, BillingError> {
    let payload = find_payload(response).ok_or_else(|| {
        tracing::warn!(reply = %response, "model reply has no structured payload");
        BillingError::Extraction("no balanced {...} in model reply".to_string())
    })?;

    let raw: RawIntentPayload = serde_json::from_str(payload)
        .map_err(|e| BillingError::Extraction(format!("payload is not a flat JSON object: {e}")))?;

    validate(raw, today)
}

fn validate(raw: RawIntentPayload, today: NaiveDate) -> Result<ExtractedIntent, BillingError> {
    let client = raw
        .client
        .filter(|c| !c.trim().is_empty())
        .ok_or_else(|| BillingError::Validation("client".to_string()))?;

    let amount = raw
        .amount
        .as_ref()
        .and_then(parse_amount)
        .filter(|a| a.is_sign_positive() && !a.is_zero())
        .ok_or_else(|| BillingError::Validation("amount".to_string()))?;

    let amount_in_words = match raw.amount_words {
        Some(words) if !words.trim().is_empty() => words,
        _ => locale::amount_in_words(amount)
            .ok_or_else(|| BillingError::Validation("amount".to_string()))?,
    };

    let date = locale::normalize_date(raw.date.as_deref().unwrap_or(""), today);

    let service = raw.service.filter(|s| !s.trim().is_empty());

    Ok(ExtractedIntent {
        client,
        amount,
        amount_in_words,
        date,
        service,
    })
}

/// First substring that opens with `{` and closes with its matching `}`.
/// Braces inside JSON string literals do not count.
fn find_payload(response: &str) -> Option<&str> {
    let mut search_from = 0;
    while let Some(offset) = response[search_from..].find('{') {
        let start = search_from + offset;
        if let Some(end) = matching_brace(&response[start..]) {
            return Some(&response[start..=start + end]);
        }
        search_from = start + 1;
    }
    None
}

fn matching_brace(s: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in s.char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

/// Accepts a JSON number or a numeric string such as `"1 200,50 грн"`.
fn parse_amount(value: &serde_json::Value) -> Option<Decimal> {
    let text = match value {
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::String(s) => s
            .trim()
            .trim_end_matches('.')
            .trim_end_matches("грн")
            .trim_end_matches('₴')
            .chars()
            .filter(|c| !c.is_whitespace())
            .map(|c| if c == ',' { '.' } else { c })
            .collect(),
        _ => return None,
    };

    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 7).unwrap()
    }

    struct CannedLlm {
        reply: String,
        prompts: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl LlmProvider for CannedLlm {
        async fn chat(&self, system_prompt: &str, messages: &[Message]) -> anyhow::Result<String> {
            assert_eq!(system_prompt, SYSTEM_PROMPT);
            self.prompts
                .lock()
                .unwrap()
                .extend(messages.iter().map(|m| m.content.clone()));
            Ok(self.reply.clone())
        }
    }

    struct FailingLlm;

    #[async_trait]
    impl LlmProvider for FailingLlm {
        async fn chat(&self, _system_prompt: &str, _messages: &[Message]) -> anyhow::Result<String> {
            anyhow::bail!("connection reset")
        }
    }

    #[test]
    fn test_parse_payload_inside_prose() {
        let reply = r#"Ось результат: {"client":"Іваненко","amount":500,"amount_words":"п'ятсот гривень","date":"7 червня 2025 р.","service":""} Дякую!"#;
        let intent = parse_intent_response(reply, today()).unwrap();
        assert_eq!(intent.client, "Іваненко");
        assert_eq!(intent.amount, Decimal::from(500));
        assert_eq!(intent.amount_in_words, "п'ятсот гривень");
        assert_eq!(intent.date, "7 червня 2025 р.");
        assert_eq!(intent.service, None);
    }

    #[test]
    fn test_fields_returned_verbatim() {
        let payload = serde_json::json!({
            "client": "ТОВ \"Ромашка\"",
            "amount": 1250.5,
            "amount_words": "одна тисяча двісті п'ятдесят гривень 50 копійок",
            "date": "1 травня 2025 р.",
            "service": "Консультація {юридична}",
        });
        let reply = format!("```json\n{payload}\n```");
        let intent = parse_intent_response(&reply, today()).unwrap();
        assert_eq!(intent.client, "ТОВ \"Ромашка\"");
        assert_eq!(intent.amount, Decimal::from_str("1250.5").unwrap());
        assert_eq!(
            intent.amount_in_words,
            "одна тисяча двісті п'ятдесят гривень 50 копійок"
        );
        assert_eq!(intent.date, "1 травня 2025 р.");
        assert_eq!(intent.service.as_deref(), Some("Консультація {юридична}"));
    }

    #[test]
    fn test_no_payload_is_extraction_error() {
        let err = parse_intent_response("Вибачте, я не зрозумів запит.", today()).unwrap_err();
        assert!(matches!(err, BillingError::Extraction(_)));
    }

    #[test]
    fn test_unbalanced_payload_is_extraction_error() {
        let err = parse_intent_response(r#"{"client":"Іваненко""#, today()).unwrap_err();
        assert!(matches!(err, BillingError::Extraction(_)));
    }

    #[test]
    fn test_non_object_shape_is_extraction_error() {
        let err = parse_intent_response(r#"{"client": ["a", "b"]}"#, today()).unwrap_err();
        assert!(matches!(err, BillingError::Extraction(_)));
    }

    #[test]
    fn test_first_balanced_payload_wins() {
        let reply = r#"{"client":"Перший","amount":1} {"client":"Другий","amount":2}"#;
        let intent = parse_intent_response(reply, today()).unwrap();
        assert_eq!(intent.client, "Перший");
    }

    #[test]
    fn test_missing_client_is_validation_error() {
        let err = parse_intent_response(r#"{"client":"  ","amount":500}"#, today()).unwrap_err();
        assert!(matches!(err, BillingError::Validation(ref f) if f == "client"));
    }

    #[test]
    fn test_missing_amount_is_validation_error() {
        let err = parse_intent_response(r#"{"client":"Іваненко","amount":null}"#, today())
            .unwrap_err();
        assert!(matches!(err, BillingError::Validation(ref f) if f == "amount"));

        let err = parse_intent_response(r#"{"client":"Іваненко","amount":-5}"#, today())
            .unwrap_err();
        assert!(matches!(err, BillingError::Validation(ref f) if f == "amount"));
    }

    #[test]
    fn test_amount_as_string() {
        let reply = r#"{"client":"Іваненко","amount":"1 200,50 грн"}"#;
        let intent = parse_intent_response(reply, today()).unwrap();
        assert_eq!(intent.amount, Decimal::from_str("1200.50").unwrap());
    }

    #[test]
    fn test_missing_words_and_relative_date_are_filled() {
        let reply = r#"{"client":"Іваненко","amount":22,"amount_words":"","date":"сьогодні","service":"Аудит"}"#;
        let intent = parse_intent_response(reply, today()).unwrap();
        assert_eq!(intent.amount_in_words, "двадцять дві гривні");
        assert_eq!(intent.date, "7 червня 2025 р.");
        assert_eq!(intent.service.as_deref(), Some("Аудит"));
    }

    #[test]
    fn test_amount_too_large_to_spell_is_validation_error() {
        let reply = r#"{"client":"Іваненко","amount":20000000000000000000,"amount_words":""}"#;
        let err = parse_intent_response(reply, today()).unwrap_err();
        assert!(matches!(err, BillingError::Validation(ref f) if f == "amount"));
    }

    #[test]
    fn test_prompt_embeds_text_and_today() {
        let prompt = build_prompt("Вистав рахунок на Іваненко", today());
        assert!(prompt.contains("\"\"\"Вистав рахунок на Іваненко\"\"\""));
        assert!(prompt.contains("7 червня 2025 р."));
    }

    #[tokio::test]
    async fn test_extract_intent_calls_model_once() {
        let llm = CannedLlm {
            reply: r#"{"client":"Іваненко","amount":500,"amount_words":"п'ятсот гривень","date":"7 червня 2025 р.","service":""}"#.to_string(),
            prompts: Mutex::new(vec![]),
        };
        let intent = extract_intent(&llm, "рахунок на Іваненко 500 грн", today())
            .await
            .unwrap();
        assert_eq!(intent.client, "Іваненко");
        assert_eq!(llm.prompts.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_extract_intent_transport_error() {
        let err = extract_intent(&FailingLlm, "рахунок", today()).await.unwrap_err();
        assert!(matches!(err, BillingError::Transport(_)));
    }
}
