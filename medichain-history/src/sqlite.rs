use std::str::FromStr;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

use crate::migrations::run_migrations;
use crate::{ops, HistoryError, MessageRole, MessageStore, SessionSummary, StoredMessage};

#[derive(Debug, Clone)]
pub struct SqliteMessageStore {
    pool: sqlx::SqlitePool,
}

#[derive(Debug, Clone)]
pub struct SqliteMessageStoreBuilder {
    database_url: String,
    max_connections: u32,
}

impl SqliteMessageStore {
    pub fn builder(database_url: impl Into<String>) -> SqliteMessageStoreBuilder {
        SqliteMessageStoreBuilder {
            database_url: database_url.into(),
            max_connections: 1,
        }
    }

    pub fn pool(&self) -> &sqlx::SqlitePool {
        &self.pool
    }
}

impl SqliteMessageStoreBuilder {
    pub fn max_connections(mut self, max_connections: u32) -> Self {
        self.max_connections = max_connections;
        self
    }

    pub async fn build(self) -> Result<SqliteMessageStore, HistoryError> {
        let options = SqliteConnectOptions::from_str(&self.database_url)
            .map_err(HistoryError::Connection)?
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(self.max_connections)
            .connect_with(options)
            .await
            .map_err(HistoryError::Connection)?;

        run_migrations(&pool).await?;
        tracing::debug!(url = %self.database_url, "sqlite message store ready");

        Ok(SqliteMessageStore { pool })
    }
}

#[async_trait]
impl MessageStore for SqliteMessageStore {
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
