mod document;
mod embedding;
mod error;
mod llm;
mod runnable;
pub mod state;
mod vector_store;

pub use document::Document;
pub use embedding::Embedding;
pub use error::{EmbeddingError, MedichainError, StoreError};
pub use llm::{LlmRequest, LlmResponse, Message, Role};
pub use runnable::{Runnable, StreamEvent};
pub use state::{GraphState, StateSchema, StateUpdate};
pub use vector_store::{SearchResult, VectorStore};

pub type Value = serde_json::Value;
