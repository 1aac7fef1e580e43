use medichain_core::{Document, StateSchema};
use serde::{Deserialize, Serialize};

/// Result of one answer strategy within a turn.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StrategyOutcome {
    #[default]
    NotAttempted,
    Failed,
    Success { text: String, source: String },
}

impl StrategyOutcome {
    pub fn success(text: impl Into<String>, source: impl Into<String>) -> Self {
        Self::Success {
            text: text.into(),
            source: source.into(),
        }
    }

    pub fn attempted(&self) -> bool {
        !matches!(self, Self::NotAttempted)
    }

    pub fn succeeded(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Answer text and its source label, when the strategy succeeded.
    pub fn answer(&self) -> Option<(&str, &str)> {
        match self {
            Self::Success { text, source } => Some((text, source)),
            _ => None,
        }
    }
}

/// Planner decision for where a turn starts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Route {
    Retriever,
    LlmAgent,
}

impl Route {
    pub fn as_str(&self) -> &'static str {
        match self {
            Route::Retriever => "retriever",
            Route::LlmAgent => "llm_agent",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryRole {
    User,
    Assistant,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub role: HistoryRole,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl HistoryEntry {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: HistoryRole::User,
            content: content.into(),
            source: None,
        }
    }

    pub fn assistant(content: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            role: HistoryRole::Assistant,
            content: content.into(),
            source: Some(source.into()),
        }
    }
}

/// Everything a conversation carries between nodes and across turns.
///
/// `conversation_history` and `retry_count` belong to the session; every
/// other field belongs to the current turn and is cleared by [`begin_turn`].
///
/// [`begin_turn`]: AgentState::begin_turn
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentState {
    pub question: String,
    pub generation: Option<String>,
    pub source: String,
    pub documents: Option<Vec<Document>>,
    pub llm: StrategyOutcome,
    pub rag: StrategyOutcome,
    pub wiki: StrategyOutcome,
    pub web: StrategyOutcome,
    pub current_tool: Option<Route>,
    pub conversation_history: Vec<HistoryEntry>,
    pub retry_count: Option<u32>,
}

impl AgentState {
    pub fn new() -> Self {
        Self::default()
    }

    /// A fresh session seeded with previously stored exchanges.
    pub fn with_history(history: Vec<HistoryEntry>) -> Self {
        Self {
            conversation_history: history,
            ..Self::default()
        }
    }

    /// Reset every per-turn field and set the new question.
    pub fn begin_turn(&mut self, question: impl Into<String>) {
        *self = Self {
            question: question.into(),
            conversation_history: std::mem::take(&mut self.conversation_history),
            retry_count: self.retry_count,
            ..Self::default()
        };
    }

    /// The last `n` history entries, oldest first.
    pub fn recent_history(&self, n: usize) -> &[HistoryEntry] {
        let start = self.conversation_history.len().saturating_sub(n);
        &self.conversation_history[start..]
    }

    pub fn llm_attempted(&self) -> bool {
        self.llm.attempted()
    }

    pub fn llm_success(&self) -> bool {
        self.llm.succeeded()
    }

    pub fn rag_attempted(&self) -> bool {
        self.rag.attempted()
    }

    pub fn rag_success(&self) -> bool {
        self.rag.succeeded()
    }

    pub fn wiki_attempted(&self) -> bool {
        self.wiki.attempted()
    }

    pub fn wiki_success(&self) -> bool {
        self.wiki.succeeded()
    }

    pub fn web_attempted(&self) -> bool {
        self.web.attempted()
    }

    pub fn web_success(&self) -> bool {
        self.web.succeeded()
    }
}

impl StateSchema for AgentState {
    type Update = AgentState;

    fn apply(_current: &Self, update: AgentState) -> Self {
        update
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn begin_turn_clears_turn_fields_and_keeps_session_fields() {
        let mut state = AgentState::with_history(vec![
            HistoryEntry::user("sốt"),
            HistoryEntry::assistant("Bạn nên nghỉ ngơi.", "AI Medical Knowledge"),
        ]);
        state.question = "cũ".to_string();
        state.generation = Some("old".to_string());
        state.source = "Wikipedia".to_string();
        state.documents = Some(vec![Document::new("d", "x")]);
        state.llm = StrategyOutcome::Failed;
        state.rag = StrategyOutcome::success("t", "s");
        state.current_tool = Some(Route::Retriever);
        state.retry_count = Some(2);

        state.begin_turn("ho khan");

        assert_eq!(state.question, "ho khan");
        assert!(state.generation.is_none());
        assert!(state.source.is_empty());
        assert!(state.documents.is_none());
        assert!(!state.llm_attempted());
        assert!(!state.rag_attempted());
        assert!(state.current_tool.is_none());
        assert_eq!(state.conversation_history.len(), 2);
        assert_eq!(state.retry_count, Some(2));
    }

    #[test]
    fn recent_history_returns_tail() {
        let mut state = AgentState::new();
        for i in 0..7 {
            state.conversation_history.push(HistoryEntry::user(i.to_string()));
        }
        let tail: Vec<&str> = state
            .recent_history(5)
            .iter()
            .map(|entry| entry.content.as_str())
            .collect();
        assert_eq!(tail, vec!["2", "3", "4", "5", "6"]);
        assert_eq!(state.recent_history(50).len(), 7);
    }

    #[test]
    fn outcome_accessors() {
        assert!(!StrategyOutcome::NotAttempted.attempted());
        assert!(StrategyOutcome::Failed.attempted());
        assert!(!StrategyOutcome::Failed.succeeded());
        let ok = StrategyOutcome::success("answer", "Wikipedia");
        assert_eq!(ok.answer(), Some(("answer", "Wikipedia")));
    }
}
