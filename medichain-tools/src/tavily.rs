use async_trait::async_trait;
use medichain_core::Document;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::{check_status, http_client, KnowledgeSource, ToolError};

const TAVILY_BASE_URL: &str = "https://api.tavily.com";

/// Web search through the Tavily `/search` API.
pub struct TavilySource {
    base_url: String,
    api_key: SecretString,
    search_depth: String,
    http: reqwest::Client,
}

#[derive(Serialize)]
struct SearchRequest<'a> {
    query: &'a str,
    max_results: usize,
    search_depth: &'a str,
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchHit>,
}

#[derive(Deserialize)]
struct SearchHit {
    #[serde(default)]
    title: String,
    url: String,
    #[serde(default)]
    content: String,
}

impl TavilySource {
    pub fn new(api_key: impl Into<String>) -> Result<Self, ToolError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(ToolError::InvalidConfig("tavily api key is empty".to_string()));
        }
        Ok(Self {
            base_url: TAVILY_BASE_URL.to_string(),
            api_key: SecretString::new(api_key),
            search_depth: "basic".to_string(),
            http: http_client()?,
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// `basic` (default) or `advanced`.
    pub fn with_search_depth(mut self, depth: impl Into<String>) -> Self {
        self.search_depth = depth.into();
        self
    }
}

#[async_trait]
impl KnowledgeSource for TavilySource {
    fn name(&self) -> &str {
        "tavily"
    }

    async fn lookup(&self, query: &str, k: usize) -> Result<Vec<Document>, ToolError> {
        if k == 0 {
            return Ok(Vec::new());
        }
        let request = SearchRequest {
            query,
            max_results: k,
            search_depth: &self.search_depth,
        };
        let response = self
            .http
            .post(format!("{}/search", self.base_url.trim_end_matches('/')))
            .bearer_auth(self.api_key.expose_secret())
            .json(&request)
            .send()
            .await?;
        let body: SearchResponse = check_status(response).await?.json().await?;

        let documents: Vec<Document> = body
            .results
            .into_iter()
            .filter(|hit| !hit.content.trim().is_empty())
            .take(k)
            .map(|hit| {
                Document::new(hit.url.clone(), hit.content)
                    .with_metadata("source", hit.url)
                    .with_metadata("title", hit.title)
            })
            .collect();
        tracing::debug!(hits = documents.len(), "tavily lookup finished");
        Ok(documents)
    }
}
