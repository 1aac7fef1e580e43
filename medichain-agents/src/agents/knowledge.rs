use std::sync::Arc;

use async_trait::async_trait;
use medichain_core::{GraphState, MedichainError, Runnable, StateUpdate};
use medichain_llm::Llm;
use medichain_tools::KnowledgeSource;

use super::{generate, AGENT_HISTORY_WINDOW, WEB_SEARCH_SOURCE, WIKIPEDIA_SOURCE};
use crate::prompts::{format_documents, format_history, rag_prompt, MAX_CONTEXT_DOCUMENTS};
use crate::{AgentState, StrategyOutcome};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Slot {
    Wiki,
    Web,
}

/// Answers from an external source: the encyclopedia or web search.
#[derive(Clone)]
pub struct KnowledgeAgent {
    llm: Arc<dyn Llm>,
    source: Option<Arc<dyn KnowledgeSource>>,
    slot: Slot,
}

impl KnowledgeAgent {
    pub fn encyclopedia(llm: Arc<dyn Llm>, source: Option<Arc<dyn KnowledgeSource>>) -> Self {
        Self {
            llm,
            source,
            slot: Slot::Wiki,
        }
    }

    pub fn web_search(llm: Arc<dyn Llm>, source: Option<Arc<dyn KnowledgeSource>>) -> Self {
        Self {
            llm,
            source,
            slot: Slot::Web,
        }
    }

    fn label(&self) -> &'static str {
        match self.slot {
            Slot::Wiki => WIKIPEDIA_SOURCE,
            Slot::Web => WEB_SEARCH_SOURCE,
        }
    }

    async fn answer(&self, state: &mut AgentState) -> StrategyOutcome {
        let Some(source) = &self.source else {
            tracing::warn!(label = self.label(), "knowledge source not configured");
            return StrategyOutcome::Failed;
        };

        let passages = match source.lookup(&state.question, MAX_CONTEXT_DOCUMENTS).await {
            Ok(passages) if !passages.is_empty() => passages,
            Ok(_) => {
                tracing::info!(source = source.name(), "lookup returned nothing");
                return StrategyOutcome::Failed;
            }
            Err(err) => {
                tracing::warn!(source = source.name(), error = %err, "lookup failed");
                return StrategyOutcome::Failed;
            }
        };

        let history = format_history(state.recent_history(AGENT_HISTORY_WINDOW));
        let prompt = rag_prompt(&history, &state.question, &format_documents(&passages));
        match generate(&self.llm, prompt, source.name()).await {
            Some(answer) => {
                state.generation = Some(answer.clone());
                state.source = self.label().to_string();
                StrategyOutcome::success(answer, self.label())
            }
            None => StrategyOutcome::Failed,
        }
    }
}

#[async_trait]
impl Runnable<GraphState<AgentState>, StateUpdate<AgentState>> for KnowledgeAgent {
    async fn invoke(
        &self,
        input: GraphState<AgentState>,
    ) -> Result<StateUpdate<AgentState>, MedichainError> {
        let mut state = input.data;
        let outcome = self.answer(&mut state).await;
        match self.slot {
            Slot::Wiki => state.wiki = outcome,
            Slot::Web => state.web = outcome,
        }
        Ok(StateUpdate::new(state))
    }
}
