mod document_retriever;
mod error;
mod hash_embedder;
mod in_memory;
mod indexer;
mod loader;
mod retriever;
mod splitter;

use std::path::PathBuf;

use medichain_core::Document;

pub use document_retriever::DocumentRetriever;
pub use error::{IngestionError, RetrievalError};
pub use hash_embedder::HashEmbedder;
pub use in_memory::InMemoryVectorStore;
pub use indexer::Indexer;
pub use loader::{load_file_async, load_files_async, MedicalJsonLoader, PdfLoader, TextLoader};
pub use retriever::Retriever;
pub use splitter::{RecursiveCharacterTextSplitter, SplitterBuilder, SplitterConfigError};

/// Load every path and split the result into retrieval-sized chunks.
pub async fn load_and_split(
    paths: Vec<PathBuf>,
    splitter: &RecursiveCharacterTextSplitter,
) -> Result<Vec<Document>, IngestionError> {
    let documents = load_files_async(paths).await?;
    Ok(splitter.split_documents(&documents))
}
