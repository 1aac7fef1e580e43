//! Client for any provider speaking the OpenAI chat-completions format.

use std::time::Duration;

use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use url::Url;

use medichain_core::{LlmRequest, LlmResponse, MedichainError, Message, Runnable};

#[derive(Serialize, Debug)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    stream: bool,
}

#[derive(Deserialize, Debug)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize, Debug)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize, Debug)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize, Debug)]
struct OpenAiError {
    error: ErrorDetail,
}

#[derive(Deserialize, Debug)]
struct ErrorDetail {
    message: String,
}

#[derive(Clone)]
pub struct OpenAiCompatibleClient {
    base_url: Url,
    api_key: Option<SecretString>,
    default_model: String,
    http: Client,
}

impl OpenAiCompatibleClient {
    pub fn builder() -> OpenAiCompatibleBuilder {
        OpenAiCompatibleBuilder::default()
    }

    fn completions_url(&self) -> Result<Url, MedichainError> {
        self.base_url
            .join("v1/chat/completions")
            .map_err(|err| MedichainError::InvalidConfig(err.to_string()))
    }
}

pub struct OpenAiCompatibleBuilder {
    base_url: Option<Url>,
    api_key: Option<SecretString>,
    default_model: String,
    timeout: Duration,
}

impl Default for OpenAiCompatibleBuilder {
    fn default() -> Self {
        Self {
            base_url: None,
            api_key: None,
            default_model: "gpt-4o-mini".to_string(),
            timeout: Duration::from_secs(60),
        }
    }
}

impl OpenAiCompatibleBuilder {
    pub fn base_url(mut self, base_url: &str) -> Result<Self, MedichainError> {
        let mut url =
            Url::parse(base_url).map_err(|err| MedichainError::InvalidConfig(err.to_string()))?;
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        self.base_url = Some(url);
        Ok(self)
    }

    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(SecretString::new(api_key.into()));
        self
    }

    pub fn default_model(mut self, model: impl Into<String>) -> Self {
        self.default_model = model.into();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn build(self) -> Result<OpenAiCompatibleClient, MedichainError> {
        let base_url = self
            .base_url
            .ok_or_else(|| MedichainError::InvalidConfig("base_url is required".to_string()))?;
        let http = Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|err| MedichainError::LlmProvider(err.to_string()))?;
        Ok(OpenAiCompatibleClient {
            base_url,
            api_key: self.api_key,
            default_model: self.default_model,
            http,
        })
    }
}

#[async_trait::async_trait]
impl Runnable<LlmRequest, LlmResponse> for OpenAiCompatibleClient {
    async fn invoke(&self, input: LlmRequest) -> Result<LlmResponse, MedichainError> {
        let request = ChatCompletionRequest {
            model: crate::resolve_model(&input.model, &self.default_model),
            messages: &input.messages,
            temperature: input.temperature,
            stream: false,
        };

        let mut builder = self.http.post(self.completions_url()?).json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key.expose_secret());
        }
        let response = builder
            .send()
            .await
            .map_err(|err| MedichainError::LlmProvider(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<OpenAiError>(&body)
                .map(|e| e.error.message)
                .unwrap_or_else(|_| format!("HTTP {status}: {body}"));
            return Err(MedichainError::LlmProvider(message));
        }

        let response: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|err| MedichainError::LlmProvider(err.to_string()))?;
        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| MedichainError::LlmProvider("No choices in response".to_string()))?;

        Ok(LlmResponse { content })
    }
}
