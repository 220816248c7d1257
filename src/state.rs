use std::sync::{Arc, Mutex, MutexGuard};

use rusqlite::Connection;

use crate::config::AppConfig;
use crate::services::ai::LlmProvider;
use crate::services::dedup::RecentUpdates;
use crate::services::locks::ChatLocks;
use crate::services::messaging::MessagingProvider;
use crate::services::sheets::TabularStore;

pub struct AppState {
    pub db: Arc<Mutex<Connection>>,
    pub config: AppConfig,
    pub llm: Box<dyn LlmProvider>,
    pub messaging: Box<dyn MessagingProvider>,
    pub sheets: Box<dyn TabularStore>,
    pub chat_locks: ChatLocks,
    pub recent_updates: Mutex<RecentUpdates>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        conn: Connection,
        llm: Box<dyn LlmProvider>,
        messaging: Box<dyn MessagingProvider>,
        sheets: Box<dyn TabularStore>,
    ) -> Self {
        Self {
            db: Arc::new(Mutex::new(conn)),
            config,
            llm,
            messaging,
            sheets,
            chat_locks: ChatLocks::default(),
            recent_updates: Mutex::new(RecentUpdates::default()),
        }
    }

    /// Never hold the returned guard across an `.await`.
    pub fn db(&self) -> MutexGuard<'_, Connection> {
        self.db.lock().unwrap_or_else(|e| e.into_inner())
    }
}
