use std::sync::Arc;

use async_trait::async_trait;
use medichain_core::{GraphState, MedichainError, Runnable, StateUpdate};
use medichain_llm::Llm;

use super::{generate, AGENT_HISTORY_WINDOW, LLM_SOURCE};
use crate::prompts::{format_history, llm_prompt};
use crate::{AgentState, StrategyOutcome};

/// Answers from the model's own knowledge.
#[derive(Clone)]
pub struct LlmAgent {
    llm: Arc<dyn Llm>,
}

impl LlmAgent {
    pub fn new(llm: Arc<dyn Llm>) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl Runnable<GraphState<AgentState>, StateUpdate<AgentState>> for LlmAgent {
    async fn invoke(
        &self,
        input: GraphState<AgentState>,
    ) -> Result<StateUpdate<AgentState>, MedichainError> {
        let mut state = input.data;
        let history = format_history(state.recent_history(AGENT_HISTORY_WINDOW));
        let prompt = llm_prompt(&history, &state.question);

        state.llm = match generate(&self.llm, prompt, "llm_agent").await {
            Some(answer) => {
                state.generation = Some(answer.clone());
                state.source = LLM_SOURCE.to_string();
                StrategyOutcome::success(answer, LLM_SOURCE)
            }
            None => StrategyOutcome::Failed,
        };
        tracing::debug!(success = state.llm_success(), "llm agent finished");
        Ok(StateUpdate::new(state))
    }
}
