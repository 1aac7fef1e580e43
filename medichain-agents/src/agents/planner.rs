use async_trait::async_trait;
use medichain_core::{GraphState, MedichainError, Runnable, StateUpdate};

use crate::{AgentState, Planner};

/// Scores the question and records where the turn should start.
#[derive(Clone, Debug, Default)]
pub struct PlannerNode {
    planner: Planner,
}

impl PlannerNode {
    pub fn new(planner: Planner) -> Self {
        Self { planner }
    }
}

#[async_trait]
impl Runnable<GraphState<AgentState>, StateUpdate<AgentState>> for PlannerNode {
    async fn invoke(
        &self,
        input: GraphState<AgentState>,
    ) -> Result<StateUpdate<AgentState>, MedichainError> {
        let mut state = input.data;
        let plan = self.planner.score(&state.question);
        tracing::info!(
            score = plan.score,
            matches = plan.matches.len(),
            route = plan.route.as_str(),
            "planned turn"
        );
        state.current_tool = Some(plan.route);
        state.retry_count.get_or_insert(0);
        Ok(StateUpdate::new(state))
    }
}
