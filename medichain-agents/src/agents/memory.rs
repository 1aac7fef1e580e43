use async_trait::async_trait;
use medichain_core::{GraphState, MedichainError, Runnable, StateUpdate};

use crate::{AgentError, AgentState};

/// Entry node: checks the turn has a question before anything else runs.
#[derive(Clone, Debug, Default)]
pub struct MemoryNode;

#[async_trait]
impl Runnable<GraphState<AgentState>, StateUpdate<AgentState>> for MemoryNode {
    async fn invoke(
        &self,
        input: GraphState<AgentState>,
    ) -> Result<StateUpdate<AgentState>, MedichainError> {
        let state = input.data;
        if state.question.trim().is_empty() {
            return Err(AgentError::MissingQuestion.into());
        }
        tracing::debug!(
            history = state.conversation_history.len(),
            "conversation loaded"
        );
        Ok(StateUpdate::new(state))
    }
}
