use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use medichain_core::{Document, SearchResult, StoreError, VectorStore};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

#[derive(Default)]
struct StoreInner {
    docs: Vec<Option<Document>>,
    embeddings: Vec<Option<Vec<f32>>>,
    id_map: HashMap<String, usize>,
    dimension: Option<usize>,
}

/// On-disk form of the store: live documents with their embeddings attached.
#[derive(Serialize, Deserialize)]
struct Snapshot {
    dimension: Option<usize>,
    documents: Vec<Document>,
}

/// Exhaustive cosine-similarity store. Cloning shares the underlying data.
#[derive(Clone, Default)]
pub struct InMemoryVectorStore {
    inner: Arc<RwLock<StoreInner>>,
}

impl InMemoryVectorStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write all live documents to `path` as JSON.
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<(), StoreError> {
        let path = path.as_ref();
        let snapshot = {
            let inner = self.inner.read().await;
            let documents = inner
                .docs
                .iter()
                .zip(inner.embeddings.iter())
                .filter_map(|(doc, embedding)| {
                    let mut doc = doc.clone()?;
                    doc.embedding = Some(embedding.clone()?);
                    Some(doc)
                })
                .collect();
            Snapshot {
                dimension: inner.dimension,
                documents,
            }
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(internal)?;
        }
        let bytes = serde_json::to_vec(&snapshot).map_err(internal)?;
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, bytes).await.map_err(internal)?;
        tokio::fs::rename(&tmp, path).await.map_err(internal)?;
        tracing::info!(
            path = %path.display(),
            documents = snapshot.documents.len(),
            "saved vector store snapshot"
        );
        Ok(())
    }

    /// Rebuild a store from a snapshot written by [`save`](Self::save).
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await.map_err(internal)?;
        let snapshot: Snapshot = serde_json::from_slice(&bytes).map_err(internal)?;
        let store = Self::new();
        let count = snapshot.documents.len();
        store.add(snapshot.documents).await?;
        if count == 0 {
            store.inner.write().await.dimension = snapshot.dimension;
        }
        tracing::info!(path = %path.display(), documents = count, "loaded vector store snapshot");
        Ok(store)
    }
}

fn internal<E>(err: E) -> StoreError
where
    E: std::error::Error + Send + Sync + 'static,
{
    StoreError::Internal(Box::new(err))
}

#[async_trait::async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn add(&self, docs: Vec<Document>) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        for mut doc in docs {
            if doc.id.trim().is_empty() {
                return Err(StoreError::InvalidId(doc.id));
            }

            let embedding = doc
                .embedding
                .take()
                .ok_or_else(|| StoreError::MissingEmbedding(doc.id.clone()))?;
            let dimension = embedding.len();
            match inner.dimension {
                Some(expected) if expected != dimension => {
                    return Err(StoreError::DimensionMismatch {
                        expected,
                        got: dimension,
                    });
                }
                None => inner.dimension = Some(dimension),
                _ => {}
            }

            if let Some(&index) = inner.id_map.get(&doc.id) {
                inner.docs[index] = Some(doc);
                inner.embeddings[index] = Some(embedding);
            } else {
                let index = inner.docs.len();
                inner.id_map.insert(doc.id.clone(), index);
                inner.docs.push(Some(doc));
                inner.embeddings.push(Some(embedding));
            }
        }
        Ok(())
    }

    async fn search(
        &self,
        query_embedding: &[f32],
        top_k: usize,
    ) -> Result<Vec<SearchResult>, StoreError> {
        let inner = self.inner.read().await;
        let expected = inner.dimension.unwrap_or(query_embedding.len());
        if expected != query_embedding.len() {
            return Err(StoreError::DimensionMismatch {
                expected,
                got: query_embedding.len(),
            });
        }

        let mut scored: Vec<SearchResult> = inner
            .docs
            .iter()
            .zip(inner.embeddings.iter())
            .filter_map(|(doc, embedding)| {
                let (doc, embedding) = (doc.as_ref()?, embedding.as_ref()?);
                let score = cosine_similarity(query_embedding, embedding);
                Some(SearchResult {
                    document: doc.clone(),
                    score: if score.is_nan() { f32::NEG_INFINITY } else { score },
                })
            })
            .collect();

        scored.sort_by(|a, b| b.score.total_cmp(&a.score));
        scored.truncate(top_k);
        Ok(scored)
    }

    async fn delete(&self, ids: &[String]) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        for id in ids {
            if let Some(idx) = inner.id_map.remove(id) {
                inner.docs[idx] = None;
                inner.embeddings[idx] = None;
            }
        }
        Ok(())
    }

    async fn len(&self) -> usize {
        self.inner.read().await.id_map.len()
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let mut dot = 0.0;
    let mut norm_a = 0.0;
    let mut norm_b = 0.0;
    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}
