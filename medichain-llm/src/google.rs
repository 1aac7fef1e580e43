//! Google Gemini `generateContent` client.

use std::time::Duration;

use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use medichain_core::{LlmRequest, LlmResponse, MedichainError, Message, Role, Runnable};

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";

#[derive(Clone)]
pub struct GoogleClient {
    base_url: String,
    api_key: SecretString,
    model: String,
    temperature: Option<f32>,
    http: Client,
}

impl GoogleClient {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Result<Self, MedichainError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|err| MedichainError::LlmProvider(err.to_string()))?;
        Ok(Self {
            base_url: GEMINI_BASE_URL.to_string(),
            api_key: SecretString::new(api_key.into()),
            model: model.into(),
            temperature: None,
            http,
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Sampling temperature used when the request does not set one.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    fn generate_url(&self, request_model: &str) -> String {
        let model = crate::resolve_model(request_model, &self.model);
        let model = model.strip_prefix("models/").unwrap_or(model);
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            model
        )
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<Content>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GoogleErrorResponse {
    error: GoogleErrorDetail,
}

#[derive(Debug, Deserialize)]
struct GoogleErrorDetail {
    message: String,
}

fn text_part(text: &str) -> Part {
    Part {
        text: Some(text.to_string()),
    }
}

fn build_request(messages: &[Message], temperature: Option<f32>) -> GenerateContentRequest {
    let system: Vec<Part> = messages
        .iter()
        .filter(|message| message.role == Role::System)
        .map(|message| text_part(&message.content))
        .collect();
    let contents = messages
        .iter()
        .filter_map(|message| {
            let role = match message.role {
                Role::System => return None,
                Role::User => "user",
                Role::Assistant => "model",
            };
            Some(Content {
                role: Some(role.to_string()),
                parts: vec![text_part(&message.content)],
            })
        })
        .collect();

    GenerateContentRequest {
        contents,
        system_instruction: (!system.is_empty()).then_some(Content {
            role: None,
            parts: system,
        }),
        generation_config: temperature.map(|temperature| GenerationConfig { temperature }),
    }
}

fn is_blocked_finish_reason(reason: &str) -> bool {
    matches!(reason, "SAFETY" | "RECITATION" | "BLOCKLIST")
}

#[async_trait::async_trait]
impl Runnable<LlmRequest, LlmResponse> for GoogleClient {
    async fn invoke(&self, input: LlmRequest) -> Result<LlmResponse, MedichainError> {
        let request = build_request(&input.messages, input.temperature.or(self.temperature));
        tracing::debug!(
            model = crate::resolve_model(&input.model, &self.model),
            messages = input.messages.len(),
            "sending gemini generateContent request"
        );

        let response = self
            .http
            .post(self.generate_url(&input.model))
            .query(&[("key", self.api_key.expose_secret().as_str())])
            .json(&request)
            .send()
            .await
            .map_err(|err| MedichainError::LlmProvider(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<GoogleErrorResponse>(&body)
                .map(|e| e.error.message)
                .unwrap_or_else(|_| format!("HTTP {status}: {body}"));
            return Err(MedichainError::LlmProvider(message));
        }

        let response = response
            .json::<GenerateContentResponse>()
            .await
            .map_err(|err| MedichainError::LlmProvider(err.to_string()))?;

        let candidate = response
            .candidates
            .and_then(|candidates| candidates.into_iter().next())
            .ok_or_else(|| MedichainError::LlmProvider("No candidates in response".to_string()))?;

        let text: String = candidate
            .content
            .map(|content| content.parts)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|part| part.text)
            .collect();

        if text.is_empty() {
            if let Some(reason) = candidate
                .finish_reason
                .as_deref()
                .filter(|reason| is_blocked_finish_reason(reason))
            {
                return Err(MedichainError::LlmProvider(format!(
                    "Generation blocked: {reason}"
                )));
            }
        }

        Ok(LlmResponse { content: text })
    }
}
