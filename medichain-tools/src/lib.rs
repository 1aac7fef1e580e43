//! External knowledge sources consulted when neither the model nor the local
//! corpus produced an answer.

mod error;
#[cfg(feature = "search")]
mod tavily;
#[cfg(feature = "wikipedia")]
mod wikipedia;

use std::time::Duration;

use async_trait::async_trait;
use medichain_core::Document;

pub use error::ToolError;
#[cfg(feature = "search")]
pub use tavily::TavilySource;
#[cfg(feature = "wikipedia")]
pub use wikipedia::WikipediaSource;

pub(crate) const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

#[async_trait]
pub trait KnowledgeSource: Send + Sync {
    /// Short label used in logs.
    fn name(&self) -> &str;

    /// Up to `k` passages about `query`. An empty result is not an error.
    async fn lookup(&self, query: &str, k: usize) -> Result<Vec<Document>, ToolError>;
}

pub(crate) fn http_client() -> Result<reqwest::Client, ToolError> {
    reqwest::Client::builder()
        .timeout(DEFAULT_TIMEOUT)
        .user_agent(concat!("medichain/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|err| ToolError::InvalidConfig(err.to_string()))
}

pub(crate) async fn check_status(
    response: reqwest::Response,
) -> Result<reqwest::Response, ToolError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ToolError::Status {
        status: status.as_u16(),
        body,
    })
}
