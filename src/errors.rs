use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Failures of the billing pipeline. None of these reach the webhook response;
/// they are turned into a chat reply instead.
#[derive(Debug, thiserror::Error)]
pub enum BillingError {
    #[error("no structured payload in model reply: {0}")]
    Extraction(String),

    #[error("required field missing or invalid: {0}")]
    Validation(String),

    #[error("collaborator call failed: {0}")]
    Transport(String),

    #[error("pending store error: {0}")]
    Storage(String),
}

impl BillingError {
    pub fn transport(err: anyhow::Error) -> Self {
        BillingError::Transport(format!("{err:#}"))
    }

    pub fn storage(err: anyhow::Error) -> Self {
        BillingError::Storage(format!("{err:#}"))
    }

    /// Text shown to the person in the chat.
    pub fn user_message(&self) -> String {
        match self {
            BillingError::Extraction(_) => {
                "не вдалося розпізнати запит. Спробуйте сформулювати його інакше.".to_string()
            }
            BillingError::Validation(field) => match field.as_str() {
                "client" => "не вказано клієнта.".to_string(),
                "amount" => "не вказано суму або її не вдалося розпізнати.".to_string(),
                other => format!("некоректне поле '{other}'."),
            },
            BillingError::Transport(_) | BillingError::Storage(_) => {
                "сервіс тимчасово недоступний, спробуйте пізніше.".to_string()
            }
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("unauthorized")]
    Unauthorized,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
        };

        let body = serde_json::json!({ "error": self.to_string() });
        (status, axum::Json(body)).into_response()
    }
}
