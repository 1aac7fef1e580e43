use std::sync::Arc;

use async_trait::async_trait;
use medichain_core::{GraphState, MedichainError, Runnable, StateUpdate};
use medichain_llm::Llm;

use super::{generate, EXECUTOR_HISTORY_WINDOW, FALLBACK_SOURCE};
use crate::prompts::{format_documents, format_history, rag_prompt, FALLBACK_RESPONSE};
use crate::{AgentState, HistoryEntry};

/// Picks the final answer for the turn and records the exchange.
///
/// Precedence: a successful direct model answer as is; otherwise a fresh
/// answer over the retrieved passages; otherwise a successful encyclopedia
/// or web answer as is; otherwise the fixed fallback.
#[derive(Clone)]
pub struct ExecutorNode {
    llm: Arc<dyn Llm>,
}

impl ExecutorNode {
    pub fn new(llm: Arc<dyn Llm>) -> Self {
        Self { llm }
    }

    async fn select(&self, state: &AgentState) -> (String, String) {
        if state.llm_success() {
            if let Some(generation) = &state.generation {
                return (generation.clone(), state.source.clone());
            }
        }

        if let Some(documents) = state.documents.as_deref().filter(|docs| !docs.is_empty()) {
            let history = format_history(state.recent_history(EXECUTOR_HISTORY_WINDOW));
            let prompt = rag_prompt(&history, &state.question, &format_documents(documents));
            if let Some(answer) = generate(&self.llm, prompt, "executor").await {
                return (answer, state.source.clone());
            }
        }

        if let Some((text, source)) = state.wiki.answer().or_else(|| state.web.answer()) {
            return (text.to_string(), source.to_string());
        }

        tracing::info!("every strategy failed, using fallback answer");
        (FALLBACK_RESPONSE.to_string(), FALLBACK_SOURCE.to_string())
    }
}

#[async_trait]
impl Runnable<GraphState<AgentState>, StateUpdate<AgentState>> for ExecutorNode {
    async fn invoke(
        &self,
        input: GraphState<AgentState>,
    ) -> Result<StateUpdate<AgentState>, MedichainError> {
        let mut state = input.data;
        let (answer, source) = self.select(&state).await;

        state
            .conversation_history
            .push(HistoryEntry::user(state.question.clone()));
        state
            .conversation_history
            .push(HistoryEntry::assistant(answer.clone(), source.clone()));
        state.generation = Some(answer);
        state.source = source;
        tracing::info!(source = %state.source, "turn answered");
        Ok(StateUpdate::new(state))
    }
}
