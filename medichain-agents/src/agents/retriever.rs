use std::sync::Arc;

use async_trait::async_trait;
use medichain_core::{GraphState, MedichainError, Runnable, StateUpdate};
use medichain_llm::Llm;
use medichain_retrieval::DocumentRetriever;

use super::{generate, AGENT_HISTORY_WINDOW};
use crate::prompts::{format_documents, format_history, rag_prompt, MAX_CONTEXT_DOCUMENTS};
use crate::{AgentState, StrategyOutcome};

/// Answers from passages of the local medical corpus.
#[derive(Clone)]
pub struct RetrieverAgent {
    llm: Arc<dyn Llm>,
    retriever: Option<Arc<dyn DocumentRetriever>>,
    source_label: String,
}

impl RetrieverAgent {
    pub fn new(
        llm: Arc<dyn Llm>,
        retriever: Option<Arc<dyn DocumentRetriever>>,
        source_label: impl Into<String>,
    ) -> Self {
        Self {
            llm,
            retriever,
            source_label: source_label.into(),
        }
    }
}

#[async_trait]
impl Runnable<GraphState<AgentState>, StateUpdate<AgentState>> for RetrieverAgent {
    async fn invoke(
        &self,
        input: GraphState<AgentState>,
    ) -> Result<StateUpdate<AgentState>, MedichainError> {
        let mut state = input.data;
        state.rag = StrategyOutcome::Failed;

        let Some(retriever) = &self.retriever else {
            tracing::warn!("no retriever configured, skipping retrieval");
            return Ok(StateUpdate::new(state));
        };

        let documents = match retriever
            .similarity_search(&state.question, MAX_CONTEXT_DOCUMENTS)
            .await
        {
            Ok(documents) => documents,
            Err(err) => {
                tracing::warn!(error = %err, "retrieval failed");
                return Ok(StateUpdate::new(state));
            }
        };
        if documents.is_empty() {
            tracing::info!("retrieval returned no passages");
            return Ok(StateUpdate::new(state));
        }

        let history = format_history(state.recent_history(AGENT_HISTORY_WINDOW));
        let prompt = rag_prompt(&history, &state.question, &format_documents(&documents));
        tracing::debug!(passages = documents.len(), "retrieved passages");

        if let Some(answer) = generate(&self.llm, prompt, "retriever").await {
            state.generation = Some(answer.clone());
            state.source = self.source_label.clone();
            state.documents = Some(documents);
            state.rag = StrategyOutcome::success(answer, self.source_label.clone());
        }
        Ok(StateUpdate::new(state))
    }
}
