use async_trait::async_trait;
use futures::stream::{BoxStream, StreamExt};

use crate::MedichainError;

#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    ContentChunk(String),
    FinalAnswer(String),
    Metadata { key: String, value: crate::Value },
}

/// A unit of async work: LLM clients, graph nodes and agents all implement it.
#[async_trait]
pub trait Runnable<Input: Send + 'static, Output: Send + 'static> {
    async fn invoke(&self, input: Input) -> Result<Output, MedichainError>;

    /// Incremental output. Components that only produce a final value keep the
    /// default, which yields nothing.
    fn stream(&self, _input: Input) -> BoxStream<'_, Result<StreamEvent, MedichainError>> {
        futures::stream::empty().boxed()
    }
}
