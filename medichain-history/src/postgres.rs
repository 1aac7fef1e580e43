use async_trait::async_trait;

use crate::migrations::run_migrations;
use crate::{ops, HistoryError, MessageRole, MessageStore, SessionSummary, StoredMessage};

#[derive(Debug, Clone)]
pub struct PostgresMessageStore {
    pool: sqlx::PgPool,
}

#[derive(Debug, Clone)]
pub struct PostgresMessageStoreBuilder {
    database_url: String,
    max_connections: u32,
    min_connections: u32,
}

impl PostgresMessageStore {
    pub fn builder(database_url: impl Into<String>) -> PostgresMessageStoreBuilder {
        PostgresMessageStoreBuilder {
            database_url: database_url.into(),
            max_connections: 5,
            min_connections: 0,
        }
    }
}

impl PostgresMessageStoreBuilder {
    pub fn max_connections(mut self, max_connections: u32) -> Self {
        self.max_connections = max_connections;
        self
    }

    pub fn min_connections(mut self, min_connections: u32) -> Self {
        self.min_connections = min_connections;
        self
    }

    pub async fn build(self) -> Result<PostgresMessageStore, HistoryError> {
        let pool = sqlx::postgres::PgPoolOptions::new()
            .max_connections(self.max_connections)
            .min_connections(self.min_connections)
            .connect(&self.database_url)
            .await
            .map_err(HistoryError::Connection)?;

        run_migrations(&pool).await?;
        tracing::debug!("postgres message store ready");

        Ok(PostgresMessageStore { pool })
    }
}

#[async_trait]
impl MessageStore for PostgresMessageStore {
    async fn save_message(
        &self,
        session_id: &str,
        role: MessageRole,
        content: &str,
    ) -> Result<(), HistoryError> {
        ops::save_message(&self.pool, session_id, role, content).await
    }

    async fn get_chat_history(&self, session_id: &str) -> Result<Vec<StoredMessage>, HistoryError> {
        ops::get_chat_history(&self.pool, session_id).await
    }

    async fn list_sessions(&self) -> Result<Vec<SessionSummary>, HistoryError> {
        ops::list_sessions(&self.pool).await
    }

    async fn delete_session(&self, session_id: &str) -> Result<(), HistoryError> {
        ops::delete_session(&self.pool, session_id).await
    }
}
