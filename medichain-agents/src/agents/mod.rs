//! Graph nodes of the medical workflow. Each node receives the whole
//! [`AgentState`](crate::AgentState) and returns the next one.

mod executor;
mod knowledge;
mod llm;
mod memory;
mod planner;
mod retriever;

use std::sync::Arc;

use medichain_core::{LlmRequest, Runnable};
use medichain_llm::Llm;

pub use executor::ExecutorNode;
pub use knowledge::KnowledgeAgent;
pub use llm::LlmAgent;
pub use memory::MemoryNode;
pub use planner::PlannerNode;
pub use retriever::RetrieverAgent;

/// Source label for direct model answers.
pub const LLM_SOURCE: &str = "AI Medical Knowledge";
/// Source label for the fixed fallback answer.
pub const FALLBACK_SOURCE: &str = "System Message";
pub const WIKIPEDIA_SOURCE: &str = "Wikipedia";
pub const WEB_SEARCH_SOURCE: &str = "Web Search";

/// History entries shown to the strategy agents.
pub const AGENT_HISTORY_WINDOW: usize = 5;
/// History entries shown when the executor rewrites a retrieval answer.
pub const EXECUTOR_HISTORY_WINDOW: usize = 10;

/// Answers of this many characters or fewer count as a failure.
pub const MIN_ANSWER_CHARS: usize = 10;

/// Send `prompt` to the model and keep the answer only if it is long enough.
/// Provider errors are logged and reported as `None`.
pub(crate) async fn generate(llm: &Arc<dyn Llm>, prompt: String, agent: &str) -> Option<String> {
    match llm.invoke(LlmRequest::from_prompt(prompt)).await {
        Ok(response) => {
            let answer = response.content.trim();
            if answer.chars().count() > MIN_ANSWER_CHARS {
                Some(answer.to_string())
            } else {
                tracing::warn!(agent, chars = answer.chars().count(), "model answer too short");
                None
            }
        }
        Err(err) => {
            tracing::warn!(agent, error = %err, "model call failed");
            None
        }
    }
}
