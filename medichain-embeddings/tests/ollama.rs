use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use medichain_core::{Embedding, EmbeddingError};
use medichain_embeddings::OllamaEmbedding;

#[tokio::test]
async fn ollama_embedding_maps_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/embeddings"))
        .and(body_json(json!({ "model": "nomic-embed-text", "prompt": "sốt cao" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "embedding": [0.4, 0.5]
        })))
        .mount(&server)
        .await;

    let embedder = OllamaEmbedding::new(server.uri(), "nomic-embed-text", 2);
    let out = embedder.embed("sốt cao").await.unwrap();
    assert_eq!(out, vec![0.4, 0.5]);
}

#[tokio::test]
async fn ollama_embedding_rejects_wrong_dimension() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/embeddings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "embedding": [0.1, 0.2, 0.3]
        })))
        .mount(&server)
        .await;

    let embedder = OllamaEmbedding::new(server.uri(), "nomic-embed-text", 2);
    let err = embedder.embed("ho").await.unwrap_err();
    assert!(matches!(err, EmbeddingError::InvalidResponse(_)));
}

#[tokio::test]
async fn ollama_embedding_batch_embeds_each_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/embeddings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "embedding": [1.0, 0.0]
        })))
        .expect(3)
        .mount(&server)
        .await;

    let embedder = OllamaEmbedding::new(server.uri(), "nomic-embed-text", 2);
    let texts = vec!["a".to_string(), "b".to_string(), "c".to_string()];
    let out = embedder.embed_batch(&texts).await.unwrap();
    assert_eq!(out.len(), 3);
}
