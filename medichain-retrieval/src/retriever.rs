use async_trait::async_trait;
use medichain_core::{Document, Embedding, SearchResult, VectorStore};

use crate::{DocumentRetriever, RetrievalError};

/// Embeds the query and runs a nearest-neighbour search against the store.
pub struct Retriever<E, S> {
    embedder: E,
    store: S,
}

impl<E, S> Retriever<E, S>
where
    E: Embedding,
    S: VectorStore,
{
    pub fn new(embedder: E, store: S) -> Self {
        Self { embedder, store }
    }

    pub async fn retrieve(
        &self,
        query: &str,
        top_k: usize,
    ) -> Result<Vec<SearchResult>, RetrievalError> {
        let embedding = self.embedder.embed(query).await?;
        let results = self.store.search(&embedding, top_k).await?;
        Ok(results)
    }
}

#[async_trait]
impl<E, S> DocumentRetriever for Retriever<E, S>
where
    E: Embedding + Send + Sync,
    S: VectorStore + Send + Sync,
{
    async fn similarity_search(
        &self,
        query: &str,
        k: usize,
    ) -> Result<Vec<Document>, RetrievalError> {
        let results = self.retrieve(query, k).await?;
        tracing::debug!(query_len = query.len(), hits = results.len(), "similarity search");
        Ok(results.into_iter().map(|result| result.document).collect())
    }
}
