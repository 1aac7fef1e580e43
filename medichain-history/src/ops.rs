//! Message store queries shared by every SQL backend.

use chrono::Utc;
use sqlx::{Database, Pool, Row};

use crate::error::HistoryError;
use crate::model::{
    format_timestamp, parse_timestamp, title_from, MessageRole, SessionSummary, StoredMessage,
    NO_TITLE,
};
use crate::schema::{
    DELETE_CONVERSATION_SQL, DELETE_MESSAGES_SQL, INSERT_MESSAGE_SQL, SELECT_CONVERSATIONS_SQL,
    SELECT_MESSAGES_SQL, UPSERT_CONVERSATION_SQL,
};

/// Append one message and touch its conversation, in a single transaction.
pub async fn save_message<DB>(
    pool: &Pool<DB>,
    session_id: &str,
    role: MessageRole,
    content: &str,
) -> Result<(), HistoryError>
where
    DB: Database,
    for<'q> String: sqlx::Encode<'q, DB> + sqlx::Type<DB>,
    for<'q> Option<String>: sqlx::Encode<'q, DB> + sqlx::Type<DB>,
    for<'q> DB::Arguments<'q>: sqlx::IntoArguments<'q, DB>,
    for<'c> &'c mut DB::Connection: sqlx::Executor<'c, Database = DB>,
{
    let now = format_timestamp(Utc::now());
    let title = (role == MessageRole::User).then(|| title_from(content));

    let mut tx = pool.begin().await.map_err(HistoryError::Query)?;
    sqlx::query::<DB>(UPSERT_CONVERSATION_SQL)
        .bind(session_id.to_string())
        .bind(title)
        .bind(now.clone())
        .bind(now.clone())
        .execute(&mut *tx)
        .await
        .map_err(HistoryError::Query)?;
    sqlx::query::<DB>(INSERT_MESSAGE_SQL)
        .bind(uuid::Uuid::new_v4().to_string())
        .bind(session_id.to_string())
        .bind(session_id.to_string())
        .bind(content.to_string())
        .bind(role.as_sender().to_string())
        .bind(now.clone())
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(HistoryError::Query)?;
    tx.commit().await.map_err(HistoryError::Query)?;

    Ok(())
}

/// Every message of a session, oldest first. Unknown sessions yield an empty list.
pub async fn get_chat_history<DB>(
    pool: &Pool<DB>,
    session_id: &str,
) -> Result<Vec<StoredMessage>, HistoryError>
where
    DB: Database,
    for<'q> String: sqlx::Encode<'q, DB> + sqlx::Type<DB>,
    for<'r> String: sqlx::Decode<'r, DB> + sqlx::Type<DB>,
    for<'q> DB::Arguments<'q>: sqlx::IntoArguments<'q, DB>,
    for<'c> &'c Pool<DB>: sqlx::Executor<'c, Database = DB>,
    &'static str: sqlx::ColumnIndex<DB::Row>,
{
    let rows = sqlx::query::<DB>(SELECT_MESSAGES_SQL)
        .bind(session_id.to_string())
        .fetch_all(pool)
        .await
        .map_err(HistoryError::Query)?;

    rows.iter()
        .map(|row| {
            let content: String = row.try_get("content").map_err(HistoryError::Query)?;
            let sender: String = row.try_get("sender").map_err(HistoryError::Query)?;
            let created_at: String = row.try_get("created_at").map_err(HistoryError::Query)?;
            Ok(StoredMessage {
                role: MessageRole::from_sender(&sender),
                content,
                timestamp: parse_timestamp(&created_at),
            })
        })
        .collect()
}

/// Conversations, most recently active first.
pub async fn list_sessions<DB>(pool: &Pool<DB>) -> Result<Vec<SessionSummary>, HistoryError>
where
    DB: Database,
    for<'r> String: sqlx::Decode<'r, DB> + sqlx::Type<DB>,
    for<'r> Option<String>: sqlx::Decode<'r, DB> + sqlx::Type<DB>,
    for<'q> DB::Arguments<'q>: sqlx::IntoArguments<'q, DB>,
    for<'c> &'c Pool<DB>: sqlx::Executor<'c, Database = DB>,
    &'static str: sqlx::ColumnIndex<DB::Row>,
{
    let rows = sqlx::query::<DB>(SELECT_CONVERSATIONS_SQL)
        .fetch_all(pool)
        .await
        .map_err(HistoryError::Query)?;

    rows.iter()
        .map(|row| {
            let id: String = row.try_get("id").map_err(HistoryError::Query)?;
            let title: Option<String> = row.try_get("title").map_err(HistoryError::Query)?;
            let created_at: String = row.try_get("created_at").map_err(HistoryError::Query)?;
            let updated_at: String = row.try_get("updated_at").map_err(HistoryError::Query)?;
            Ok(SessionSummary {
                session_id: id,
                created_at: parse_timestamp(&created_at),
                last_active: parse_timestamp(&updated_at),
                preview: title
                    .filter(|title| !title.is_empty())
                    .unwrap_or_else(|| NO_TITLE.to_string()),
            })
        })
        .collect()
}

/// Remove a conversation and its messages. Deleting an unknown id is not an error.
pub async fn delete_session<DB>(pool: &Pool<DB>, session_id: &str) -> Result<(), HistoryError>
where
    DB: Database,
    for<'q> String: sqlx::Encode<'q, DB> + sqlx::Type<DB>,
    for<'q> DB::Arguments<'q>: sqlx::IntoArguments<'q, DB>,
    for<'c> &'c mut DB::Connection: sqlx::Executor<'c, Database = DB>,
{
    let mut tx = pool.begin().await.map_err(HistoryError::Query)?;
    for statement in [DELETE_MESSAGES_SQL, DELETE_CONVERSATION_SQL] {
        sqlx::query::<DB>(statement)
            .bind(session_id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(HistoryError::Query)?;
    }
    tx.commit().await.map_err(HistoryError::Query)?;
    Ok(())
}
