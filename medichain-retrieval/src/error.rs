use std::path::PathBuf;

use medichain_core::{EmbeddingError, StoreError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RetrievalError {
    #[error("invalid document id: {0}")]
    InvalidId(String),
    #[error("embedding error: {0}")]
    Embedding(#[from] EmbeddingError),
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

#[derive(Debug, Error)]
pub enum IngestionError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid JSON in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to extract text from {}: {message}", path.display())]
    Pdf { path: PathBuf, message: String },
    #[error("unsupported file type: {}", path.display())]
    UnsupportedExtension { path: PathBuf },
    #[error("{feature} support is not enabled in this build")]
    FeatureDisabled { feature: &'static str },
}
