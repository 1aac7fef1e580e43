use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GraphError {
    #[error("node failed: {node}: {source}")]
    NodeFailed {
        node: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    #[error("missing node: {node}")]
    MissingNode { node: String },
    #[error("entry node is not set")]
    MissingEntry,
    #[error("invalid edge to '{node}'")]
    InvalidEdge { node: String },
    #[error("router for '{from}' chose undeclared target '{to}'")]
    UndeclaredRoute { from: String, to: String },
    #[error("Max steps exceeded: reached {reached}, limit {max}")]
    MaxStepsExceeded { max: usize, reached: usize },
    #[error("Cycle detected: node '{node}' repeated in recent window")]
    CycleDetected { node: String, recent: Vec<String> },
    #[error("graph execution exceeded {limit:?}")]
    Timeout { limit: Duration },
}
