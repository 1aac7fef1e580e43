use medichain_core::{Document, VectorStore};
use medichain_retrieval::{
    DocumentRetriever, HashEmbedder, InMemoryVectorStore, Indexer, RetrievalError, Retriever,
};

#[tokio::test]
async fn indexer_rejects_blank_ids() {
    let indexer = Indexer::new(HashEmbedder::new(16), InMemoryVectorStore::new());
    let err = indexer
        .index(vec![Document::new("   ", "sốt")])
        .await
        .unwrap_err();
    assert!(matches!(err, RetrievalError::InvalidId(ref id) if id.trim().is_empty()));
}

#[tokio::test]
async fn indexed_documents_are_found_by_shared_words() {
    let store = InMemoryVectorStore::new();
    let indexer = Indexer::new(HashEmbedder::new(256), store.clone());
    let count = indexer
        .index(vec![
            Document::new("flu", "cúm gây sốt cao và ho"),
            Document::new("diabetes", "tiểu đường làm tăng đường huyết"),
            Document::new("asthma", "hen suyễn gây khó thở"),
        ])
        .await
        .unwrap();
    assert_eq!(count, 3);
    assert_eq!(store.len().await, 3);

    let retriever = Retriever::new(HashEmbedder::new(256), store);
    let docs = retriever
        .similarity_search("bệnh tiểu đường và đường huyết", 1)
        .await
        .unwrap();
    assert_eq!(docs.len(), 1);
    assert_eq!(docs[0].id, "diabetes");
}

#[tokio::test]
async fn empty_store_returns_no_documents() {
    let retriever = Retriever::new(HashEmbedder::new(8), InMemoryVectorStore::new());
    let docs = retriever.similarity_search("ho", 3).await.unwrap();
    assert!(docs.is_empty());
}
