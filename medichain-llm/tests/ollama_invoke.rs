#![cfg(feature = "ollama")]

use httpmock::prelude::*;
use medichain_core::Runnable;
use medichain_llm::{LlmRequest, OllamaClient};
use serde_json::json;

#[tokio::test]
async fn ollama_invoke_uses_client_model_when_request_is_blank() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST).path("/api/chat").json_body(json!({
            "model": "llama3.1",
            "messages": [{ "role": "user", "content": "ho kéo dài" }],
            "stream": false
        }));
        then.status(200).json_body(json!({
            "message": { "role": "assistant", "content": "Ho kéo dài có thể..." },
            "done": true
        }));
    });

    let client = OllamaClient::new(server.base_url(), "llama3.1").unwrap();
    let response = client
        .invoke(LlmRequest::from_prompt("ho kéo dài"))
        .await
        .unwrap();

    assert_eq!(response.content, "Ho kéo dài có thể...");
    mock.assert();
}

#[tokio::test]
async fn ollama_invoke_fails_on_server_error() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/api/chat");
        then.status(500);
    });

    let client = OllamaClient::new(server.base_url(), "llama3.1").unwrap();
    assert!(client.invoke(LlmRequest::from_prompt("hi")).await.is_err());
}
