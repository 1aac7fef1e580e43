//! Transition table of the medical workflow.

use crate::{AgentState, Route};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Step {
    Memory,
    Planner,
    LlmAgent,
    Retriever,
    Wikipedia,
    WebSearch,
    Executor,
    End,
}

impl Step {
    /// Every node step, in execution order of the longest possible turn.
    pub const NODES: [Step; 7] = [
        Step::Memory,
        Step::Planner,
        Step::LlmAgent,
        Step::Retriever,
        Step::Wikipedia,
        Step::WebSearch,
        Step::Executor,
    ];

    /// Node name used in the graph. `End` maps to the graph's terminal marker.
    pub fn name(&self) -> &'static str {
        match self {
            Step::Memory => "memory",
            Step::Planner => "planner",
            Step::LlmAgent => "llm_agent",
            Step::Retriever => "retriever",
            Step::Wikipedia => "wikipedia",
            Step::WebSearch => "web_search",
            Step::Executor => "executor",
            Step::End => medichain_graph::END,
        }
    }

    /// Steps `next` can return after `self`.
    pub fn successors(&self) -> &'static [Step] {
        match self {
            Step::Memory => &[Step::Planner],
            Step::Planner => &[Step::Retriever, Step::LlmAgent],
            Step::LlmAgent => &[Step::Executor, Step::Retriever, Step::Wikipedia],
            Step::Retriever => &[Step::Executor, Step::LlmAgent, Step::Wikipedia],
            Step::Wikipedia => &[Step::Executor, Step::WebSearch],
            Step::WebSearch => &[Step::Executor],
            Step::Executor => &[Step::End],
            Step::End => &[],
        }
    }
}

/// Where the turn goes after `step` has produced `state`.
///
/// The attempted flags of the model and retrieval strategies guarantee each
/// runs at most once per turn.
pub fn next(step: Step, state: &AgentState) -> Step {
    match step {
        Step::Memory => Step::Planner,
        Step::Planner => match state.current_tool {
            Some(Route::Retriever) => Step::Retriever,
            _ => Step::LlmAgent,
        },
        Step::LlmAgent if state.llm_success() => Step::Executor,
        Step::LlmAgent if !state.rag_attempted() => Step::Retriever,
        Step::LlmAgent => Step::Wikipedia,
        Step::Retriever if state.rag_success() => Step::Executor,
        Step::Retriever if !state.llm_attempted() => Step::LlmAgent,
        Step::Retriever => Step::Wikipedia,
        Step::Wikipedia if state.wiki_success() => Step::Executor,
        Step::Wikipedia => Step::WebSearch,
        Step::WebSearch => Step::Executor,
        Step::Executor | Step::End => Step::End,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StrategyOutcome;

    fn state() -> AgentState {
        AgentState::new()
    }

    #[test]
    fn planner_follows_current_tool() {
        let mut s = state();
        assert_eq!(next(Step::Planner, &s), Step::LlmAgent);
        s.current_tool = Some(Route::Retriever);
        assert_eq!(next(Step::Planner, &s), Step::Retriever);
        s.current_tool = Some(Route::LlmAgent);
        assert_eq!(next(Step::Planner, &s), Step::LlmAgent);
    }

    #[test]
    fn llm_agent_transitions() {
        let mut s = state();
        s.llm = StrategyOutcome::success("đủ dài để được chấp nhận", "AI Medical Knowledge");
        assert_eq!(next(Step::LlmAgent, &s), Step::Executor);

        s.llm = StrategyOutcome::Failed;
        assert_eq!(next(Step::LlmAgent, &s), Step::Retriever);

        s.rag = StrategyOutcome::Failed;
        assert_eq!(next(Step::LlmAgent, &s), Step::Wikipedia);
    }

    #[test]
    fn retriever_transitions() {
        let mut s = state();
        s.rag = StrategyOutcome::success("passage based answer", "Medical Database");
        assert_eq!(next(Step::Retriever, &s), Step::Executor);

        s.rag = StrategyOutcome::Failed;
        assert_eq!(next(Step::Retriever, &s), Step::LlmAgent);

        s.llm = StrategyOutcome::Failed;
        assert_eq!(next(Step::Retriever, &s), Step::Wikipedia);
    }

    #[test]
    fn external_sources_end_at_executor() {
        let mut s = state();
        assert_eq!(next(Step::Wikipedia, &s), Step::WebSearch);
        s.wiki = StrategyOutcome::success("encyclopedia text", "Wikipedia");
        assert_eq!(next(Step::Wikipedia, &s), Step::Executor);
        assert_eq!(next(Step::WebSearch, &state()), Step::Executor);
        assert_eq!(next(Step::Executor, &s), Step::End);
        assert_eq!(next(Step::Memory, &s), Step::Planner);
    }

    #[test]
    fn every_transition_is_a_declared_successor() {
        let outcomes = [
            StrategyOutcome::NotAttempted,
            StrategyOutcome::Failed,
            StrategyOutcome::success("long enough answer", "x"),
        ];
        for step in Step::NODES {
            for llm in &outcomes {
                for rag in &outcomes {
                    for wiki in &outcomes {
                        let mut s = state();
                        s.llm = llm.clone();
                        s.rag = rag.clone();
                        s.wiki = wiki.clone();
                        let target = next(step, &s);
                        assert!(
                            step.successors().contains(&target),
                            "{step:?} -> {target:?}"
                        );
                    }
                }
            }
        }
    }
}
