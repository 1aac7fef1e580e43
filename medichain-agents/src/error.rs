use medichain_graph::GraphError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("turn has no question")]
    MissingQuestion,
}

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("turn has no question")]
    MissingQuestion,
    #[error("workflow construction failed: {0}")]
    Build(#[source] GraphError),
    #[error(transparent)]
    Graph(#[from] GraphError),
}

impl From<AgentError> for medichain_core::MedichainError {
    fn from(err: AgentError) -> Self {
        medichain_core::MedichainError::InvalidConfig(err.to_string())
    }
}
