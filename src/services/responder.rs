use crate::models::ExtractedIntent;
use crate::services::messaging::MessagingProvider;

pub const USAGE_HINT: &str = "Щоб виставити рахунок, напишіть фразу типу:\nВистав рахунок та акт на <клієнта> на суму <сума> грн сьогоднішньою датою";
pub const ASK_SERVICE: &str = "Яке найменування послуги для рахунку/акту?";
pub const CANCELLED: &str = "Гаразд, запит на рахунок скасовано.";

/// Outcome of one inbound message. Each outcome maps to exactly one chat reply.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    UsageHint,
    AskService,
    ClientNotFound { name: String },
    Completed { client_name: String, intent: ExtractedIntent },
    Cancelled,
    Failed { message: String },
}

impl Reply {
    pub fn kind(&self) -> &'static str {
        match self {
            Reply::UsageHint => "usage_hint",
            Reply::AskService => "ask_service",
            Reply::ClientNotFound { .. } => "client_not_found",
            Reply::Completed { .. } => "completed",
            Reply::Cancelled => "cancelled",
            Reply::Failed { .. } => "failed",
        }
    }

    pub fn text(&self) -> String {
        match self {
            Reply::UsageHint => USAGE_HINT.to_string(),
            Reply::AskService => ASK_SERVICE.to_string(),
            Reply::ClientNotFound { name } => format!("Не знайшов клієнта '{name}' у таблиці."),
            Reply::Completed { client_name, intent } => {
                let mut text = format!(
                    "Рахунок і акт на {} на суму {} ({}) створено!",
                    client_name, intent.amount, intent.amount_in_words
                );
                if let Some(service) = &intent.service {
                    text.push_str(&format!("\nПослуга: {service}"));
                }
                if !intent.date.is_empty() {
                    text.push_str(&format!("\nДата: {}", intent.date));
                }
                text
            }
            Reply::Cancelled => CANCELLED.to_string(),
            Reply::Failed { message } => format!("Помилка: {message}"),
        }
    }
}

/// Delivers a reply. Delivery is best effort: failures are logged, never retried.
pub async fn send(messaging: &dyn MessagingProvider, chat_id: i64, reply: &Reply) {
    if let Err(e) = messaging.send_message(chat_id, &reply.text()).await {
        tracing::error!(error = %e, chat_id, kind = reply.kind(), "failed to send reply");
    }
}
