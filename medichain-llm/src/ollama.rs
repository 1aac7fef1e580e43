use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};

use medichain_core::{LlmRequest, LlmResponse, MedichainError, Message, Runnable};

/// Client for a local Ollama server's `/api/chat` endpoint.
#[derive(Clone)]
pub struct OllamaClient {
    base_url: String,
    model: String,
    http: Client,
}

impl OllamaClient {
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Result<Self, MedichainError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|err| MedichainError::LlmProvider(err.to_string()))?;
        Ok(Self {
            base_url: base_url.into(),
            model: model.into(),
            http,
        })
    }
}

#[derive(Debug, Serialize)]
struct OllamaChatRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<OllamaOptions>,
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct OllamaChatResponse {
    message: OllamaMessage,
}

#[derive(Debug, Deserialize)]
struct OllamaMessage {
    content: String,
}

#[async_trait::async_trait]
impl Runnable<LlmRequest, LlmResponse> for OllamaClient {
    async fn invoke(&self, input: LlmRequest) -> Result<LlmResponse, MedichainError> {
        let request = OllamaChatRequest {
            model: crate::resolve_model(&input.model, &self.model),
            messages: &input.messages,
            stream: false,
            options: input
                .temperature
                .map(|temperature| OllamaOptions { temperature }),
        };

        tracing::debug!(model = request.model, "sending ollama chat request");
        let url = format!("{}/api/chat", self.base_url.trim_end_matches('/'));
        let response: OllamaChatResponse = self
            .http
            .post(url)
            .json(&request)
            .send()
            .await
            .map_err(|err| MedichainError::LlmProvider(err.to_string()))?
            .error_for_status()
            .map_err(|err| MedichainError::LlmProvider(err.to_string()))?
            .json()
            .await
            .map_err(|err| MedichainError::LlmProvider(err.to_string()))?;

        Ok(LlmResponse {
            content: response.message.content,
        })
    }
}
