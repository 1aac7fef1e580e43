use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::model::{title_from, NO_TITLE};
use crate::{HistoryError, MessageRole, MessageStore, SessionSummary, StoredMessage};

struct Conversation {
    title: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    messages: Vec<StoredMessage>,
}

/// Process-local store for tests and single-node deployments without a database.
#[derive(Default)]
pub struct InMemoryMessageStore {
    conversations: RwLock<HashMap<String, Conversation>>,
}

impl InMemoryMessageStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MessageStore for InMemoryMessageStore {
    async fn save_message(
        &self,
        session_id: &str,
        role: MessageRole,
        content: &str,
    ) -> Result<(), HistoryError> {
        let now = Utc::now();
        let mut conversations = self.conversations.write().await;
        let conversation = conversations
            .entry(session_id.to_string())
            .or_insert_with(|| Conversation {
                title: None,
                created_at: now,
                updated_at: now,
                messages: Vec::new(),
            });
        if conversation.title.is_none() && role == MessageRole::User {
            conversation.title = Some(title_from(content));
        }
        conversation.updated_at = now;
        conversation.messages.push(StoredMessage {
            role,
            content: content.to_string(),
            timestamp: Some(now),
        });
        Ok(())
    }

    async fn get_chat_history(&self, session_id: &str) -> Result<Vec<StoredMessage>, HistoryError> {
        let conversations = self.conversations.read().await;
        Ok(conversations
            .get(session_id)
            .map(|conversation| conversation.messages.clone())
            .unwrap_or_default())
    }

    async fn list_sessions(&self) -> Result<Vec<SessionSummary>, HistoryError> {
        let conversations = self.conversations.read().await;
        let mut sessions: Vec<(DateTime<Utc>, SessionSummary)> = conversations
            .iter()
            .map(|(id, conversation)| {
                let summary = SessionSummary {
                    session_id: id.clone(),
                    created_at: Some(conversation.created_at),
                    last_active: Some(conversation.updated_at),
                    preview: conversation
                        .title
                        .clone()
                        .filter(|title| !title.is_empty())
                        .unwrap_or_else(|| NO_TITLE.to_string()),
                };
                (conversation.updated_at, summary)
            })
            .collect();
        sessions.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.session_id.cmp(&b.1.session_id)));
        Ok(sessions.into_iter().map(|(_, summary)| summary).collect())
    }

    async fn delete_session(&self, session_id: &str) -> Result<(), HistoryError> {
        self.conversations.write().await.remove(session_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn keeps_messages_in_order_per_session() {
        let store = InMemoryMessageStore::new();
        store.save_message("s1", MessageRole::User, "Tôi bị sốt").await.unwrap();
        store
            .save_message("s1", MessageRole::Assistant, "Bạn nên nghỉ ngơi.")
            .await
            .unwrap();
        store.save_message("s2", MessageRole::User, "Ho khan").await.unwrap();

        let history = store.get_chat_history("s1").await.unwrap();
        let roles: Vec<MessageRole> = history.iter().map(|m| m.role).collect();
        assert_eq!(roles, vec![MessageRole::User, MessageRole::Assistant]);
        assert_eq!(history[1].content, "Bạn nên nghỉ ngơi.");
        assert!(store.get_chat_history("missing").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn sessions_use_first_user_message_as_preview() {
        let store = InMemoryMessageStore::new();
        store
            .save_message("bot-first", MessageRole::Assistant, "Xin chào")
            .await
            .unwrap();
        store.save_message("s1", MessageRole::User, "Đau bụng").await.unwrap();
        store.save_message("s1", MessageRole::User, "Còn buồn nôn").await.unwrap();

        let sessions = store.list_sessions().await.unwrap();
        let s1 = sessions.iter().find(|s| s.session_id == "s1").unwrap();
        assert_eq!(s1.preview, "Đau bụng");
        let bot_first = sessions.iter().find(|s| s.session_id == "bot-first").unwrap();
        assert_eq!(bot_first.preview, "No Title");

        store.delete_session("s1").await.unwrap();
        assert_eq!(store.list_sessions().await.unwrap().len(), 1);
    }
}
