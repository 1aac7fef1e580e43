//! Chat transcript persistence keyed by session id.
//!
//! The workflow never depends on this crate: the HTTP boundary saves each
//! exchange best-effort and hydrates sessions from it on first use.

pub mod error;
mod memory;
pub mod migrations;
mod model;
pub mod ops;
mod postgres;
pub mod schema;
mod sqlite;

use std::sync::Arc;

use async_trait::async_trait;

pub use error::HistoryError;
pub use memory::InMemoryMessageStore;
pub use model::{MessageRole, SessionSummary, StoredMessage};
pub use postgres::{PostgresMessageStore, PostgresMessageStoreBuilder};
pub use sqlite::{SqliteMessageStore, SqliteMessageStoreBuilder};

#[async_trait]
pub trait MessageStore: Send + Sync {
    async fn save_message(
        &self,
        session_id: &str,
        role: MessageRole,
        content: &str,
    ) -> Result<(), HistoryError>;

    async fn get_chat_history(&self, session_id: &str) -> Result<Vec<StoredMessage>, HistoryError>;

    async fn list_sessions(&self) -> Result<Vec<SessionSummary>, HistoryError>;

    async fn delete_session(&self, session_id: &str) -> Result<(), HistoryError>;
}

/// Open a store for `database_url`, picking the backend from its scheme.
/// `memory:` gives a process-local store.
pub async fn connect(database_url: &str) -> Result<Arc<dyn MessageStore>, HistoryError> {
    if database_url == "memory:" {
        return Ok(Arc::new(InMemoryMessageStore::new()));
    }
    if database_url.starts_with("sqlite:") {
        let store = SqliteMessageStore::builder(database_url).build().await?;
        return Ok(Arc::new(store));
    }
    if database_url.starts_with("postgres://") || database_url.starts_with("postgresql://") {
        let store = PostgresMessageStore::builder(database_url).build().await?;
        return Ok(Arc::new(store));
    }
    Err(HistoryError::InvalidConfig(format!(
        "unsupported database url scheme: {database_url}"
    )))
}
