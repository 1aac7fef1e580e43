mod config;
mod error;
mod graph;
mod observer;
mod program;

pub use config::{ExecutionConfig, ExecutionOptions};
pub use error::GraphError;
pub use graph::{ExecutableGraph, GraphBuilder, END};
pub use medichain_core::{GraphState, StateSchema, StateUpdate};
pub use observer::Observer;
pub use program::{EdgeKind, GraphProgram};
