use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use medichain_agents::{AgentState, HistoryEntry, HistoryRole, MedicalWorkflow};
use medichain_history::{MessageRole, MessageStore, StoredMessage};
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::config::DEFAULT_TURN_TIMEOUT;

/// One live conversation. `hydrated` flips once the stored history is loaded.
#[derive(Default)]
pub(crate) struct Session {
    pub(crate) state: AgentState,
    hydrated: bool,
}

type SessionSlot = Arc<Mutex<Session>>;

/// Shared handler state. Cloning is cheap; clones share sessions.
///
/// Each session sits behind its own lock, held for a whole turn, so turns on
/// one conversation run one after another while different conversations
/// proceed independently.
#[derive(Clone)]
pub struct AppState {
    workflow: Arc<MedicalWorkflow>,
    store: Option<Arc<dyn MessageStore>>,
    sessions: Arc<Mutex<HashMap<String, SessionSlot>>>,
    turn_timeout: Duration,
}

impl AppState {
    pub fn new(workflow: Arc<MedicalWorkflow>) -> Self {
        Self {
            workflow,
            store: None,
            sessions: Arc::new(Mutex::new(HashMap::new())),
            turn_timeout: DEFAULT_TURN_TIMEOUT,
        }
    }

    pub fn with_store(mut self, store: Arc<dyn MessageStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub(crate) fn with_turn_timeout(mut self, turn_timeout: Duration) -> Self {
        self.turn_timeout = turn_timeout;
        self
    }

    pub fn workflow(&self) -> &MedicalWorkflow {
        &self.workflow
    }

    pub fn store(&self) -> Option<&Arc<dyn MessageStore>> {
        self.store.as_ref()
    }

    pub fn turn_timeout(&self) -> Duration {
        self.turn_timeout
    }

    /// Snapshot of a session's committed state. Waits for a running turn.
    pub async fn session(&self, session_id: &str) -> Option<AgentState> {
        let slot = self.sessions.lock().await.get(session_id).cloned()?;
        let session = slot.lock().await;
        Some(session.state.clone())
    }

    /// Exclusive access to a session for one turn, creating it (and seeding it
    /// from the store) on first use.
    pub(crate) async fn lock_session(&self, session_id: &str) -> OwnedMutexGuard<Session> {
        let slot = {
            let mut sessions = self.sessions.lock().await;
            Arc::clone(sessions.entry(session_id.to_string()).or_default())
        };
        let mut session = slot.lock_owned().await;
        if !session.hydrated {
            session.state = AgentState::with_history(self.stored_history(session_id).await);
            session.hydrated = true;
        }
        session
    }

    pub(crate) async fn forget(&self, session_id: &str) -> bool {
        self.sessions.lock().await.remove(session_id).is_some()
    }

    async fn stored_history(&self, session_id: &str) -> Vec<HistoryEntry> {
        let Some(store) = &self.store else {
            return Vec::new();
        };
        match store.get_chat_history(session_id).await {
            Ok(messages) => {
                tracing::debug!(session_id, messages = messages.len(), "seeded session history");
                messages.into_iter().map(history_entry).collect()
            }
            Err(err) => {
                tracing::warn!(session_id, error = %err, "failed to load stored history");
                Vec::new()
            }
        }
    }

    /// Persist one message; failures are logged and never reach the caller.
    pub(crate) async fn record(&self, session_id: &str, role: MessageRole, content: &str) {
        if let Some(store) = &self.store {
            if let Err(err) = store.save_message(session_id, role, content).await {
                tracing::warn!(session_id, error = %err, "failed to save message");
            }
        }
    }
}

fn history_entry(message: StoredMessage) -> HistoryEntry {
    match message.role {
        MessageRole::User => HistoryEntry::user(message.content),
        MessageRole::Assistant => HistoryEntry {
            role: HistoryRole::Assistant,
            content: message.content,
            source: None,
        },
    }
}
