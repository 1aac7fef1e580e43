//! Chat model clients. Every client is a `Runnable<LlmRequest, LlmResponse>`.

#[cfg(feature = "google")]
mod google;
#[cfg(feature = "ollama")]
mod ollama;
#[cfg(feature = "openai")]
pub mod openai_compatible;

#[cfg(feature = "google")]
pub use google::{GoogleClient, DEFAULT_GEMINI_MODEL};
#[cfg(feature = "ollama")]
pub use ollama::OllamaClient;
#[cfg(feature = "openai")]
pub use openai_compatible::{OpenAiCompatibleBuilder, OpenAiCompatibleClient};

pub use medichain_core::{LlmRequest, LlmResponse, Message, Role};

use medichain_core::Runnable;

pub trait Llm: Runnable<LlmRequest, LlmResponse> + Send + Sync {}

impl<T> Llm for T where T: Runnable<LlmRequest, LlmResponse> + Send + Sync {}

pub(crate) fn resolve_model<'a>(requested: &'a str, fallback: &'a str) -> &'a str {
    let requested = requested.trim();
    if requested.is_empty() {
        fallback
    } else {
        requested
    }
}
