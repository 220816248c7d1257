use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use billing_bot::config::AppConfig;
use billing_bot::db;
use billing_bot::handlers;
use billing_bot::services::ai::openai::OpenAiProvider;
use billing_bot::services::messaging::telegram::TelegramBotProvider;
use billing_bot::services::sheets::google::{GoogleSheetsStore, ServiceAccountKey};
use billing_bot::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env();

    anyhow::ensure!(!config.telegram_token.is_empty(), "TELEGRAM_TOKEN must be set");
    anyhow::ensure!(!config.openai_api_key.is_empty(), "OPENAI_API_KEY must be set");
    anyhow::ensure!(!config.google_sheets_id.is_empty(), "GOOGLE_SHEETS_ID must be set");
    anyhow::ensure!(
        !config.google_service_account_json.is_empty(),
        "GOOGLE_SERVICE_ACCOUNT_JSON must be set"
    );

    let conn = db::init_db(&config.database_url)?;

    tracing::info!("using OpenAI-compatible model {} at {}", config.openai_model, config.openai_base_url);
    let llm = OpenAiProvider::new(
        config.openai_api_key.clone(),
        config.openai_model.clone(),
        config.openai_base_url.clone(),
    );
    let messaging = TelegramBotProvider::new(config.telegram_token.clone());
    let key = ServiceAccountKey::from_file(&config.google_service_account_json)?;
    tracing::info!(service_account = %key.client_email, "using Google Sheets store");
    let sheets = GoogleSheetsStore::new(config.google_sheets_id.clone(), key);

    let state = Arc::new(AppState::new(
        config.clone(),
        conn,
        Box::new(llm),
        Box::new(messaging),
        Box::new(sheets),
    ));

    let app = Router::new()
        .route("/health", get(handlers::health::health))
        .route("/webhook/telegram", post(handlers::webhook::telegram_webhook))
        .route("/api/admin/pending", get(handlers::admin::list_pending))
        .route(
            "/api/admin/pending/:chat_id/cancel",
            post(handlers::admin::cancel_pending),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
