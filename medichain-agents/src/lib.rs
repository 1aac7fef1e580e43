//! Medical question answering as a routed fallback chain.
//!
//! A turn enters at the memory node, is scored by the [`Planner`], then tries
//! the direct model answer and retrieval-augmented answer (in the planner's
//! preferred order), the encyclopedia, and web search, until one succeeds.
//! The executor picks the final answer and records the exchange in history.

pub mod agents;
mod error;
pub mod planner;
pub mod prompts;
pub mod router;
mod state;
mod workflow;

pub use error::{AgentError, WorkflowError};
pub use planner::{KeywordCategory, KeywordMatch, PlanScore, Planner, PlannerConfig, PlannerWeights};
pub use router::Step;
pub use state::{AgentState, HistoryEntry, HistoryRole, Route, StrategyOutcome};
pub use workflow::{MedicalWorkflow, MedicalWorkflowBuilder, DEFAULT_RAG_SOURCE};
