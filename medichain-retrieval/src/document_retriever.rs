use async_trait::async_trait;
use medichain_core::Document;

use crate::RetrievalError;

/// Query-to-passages lookup used by the retrieval agent.
#[async_trait]
pub trait DocumentRetriever: Send + Sync {
    /// Up to `k` documents most relevant to `query`, best first. May be empty.
    async fn similarity_search(&self, query: &str, k: usize)
        -> Result<Vec<Document>, RetrievalError>;
}
