use thiserror::Error;

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("failed to connect to history database: {0}")]
    Connection(#[source] sqlx::Error),
    #[error("history schema migration failed: {0}")]
    Migration(#[source] sqlx::Error),
    #[error("history query failed: {0}")]
    Query(#[source] sqlx::Error),
    #[error("invalid history configuration: {0}")]
    InvalidConfig(String),
}
