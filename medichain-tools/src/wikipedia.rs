use async_trait::async_trait;
use medichain_core::Document;
use serde::Deserialize;
use url::Url;

use crate::{check_status, http_client, KnowledgeSource, ToolError};

/// Wikipedia lookup: full-text page search, then the summary of each hit.
pub struct WikipediaSource {
    base_url: Url,
    http: reqwest::Client,
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    pages: Vec<SearchPage>,
}

#[derive(Deserialize)]
struct SearchPage {
    key: String,
    title: String,
}

#[derive(Deserialize)]
struct PageSummary {
    title: String,
    #[serde(default)]
    extract: String,
    content_urls: Option<ContentUrls>,
}

#[derive(Deserialize)]
struct ContentUrls {
    desktop: Option<PageLink>,
}

#[derive(Deserialize)]
struct PageLink {
    page: String,
}

impl WikipediaSource {
    /// Source for the `language` edition, e.g. `vi` or `en`.
    pub fn new(language: &str) -> Result<Self, ToolError> {
        let base = format!("https://{}.wikipedia.org/", language.trim());
        Self::with_base_url(&base)
    }

    pub fn with_base_url(base_url: &str) -> Result<Self, ToolError> {
        let mut base_url =
            Url::parse(base_url).map_err(|err| ToolError::InvalidConfig(err.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(ToolError::InvalidConfig(format!(
                "not a base url: {base_url}"
            )));
        }
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self {
            base_url,
            http: http_client()?,
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, ToolError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ToolError::InvalidConfig(format!("not a base url: {}", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn search(&self, query: &str, k: usize) -> Result<Vec<SearchPage>, ToolError> {
        let url = self.endpoint(&["w", "rest.php", "v1", "search", "page"])?;
        let limit = k.to_string();
        let response = self
            .http
            .get(url)
            .query(&[("q", query), ("limit", limit.as_str())])
            .send()
            .await?;
        let body: SearchResponse = check_status(response).await?.json().await?;
        Ok(body.pages)
    }

    async fn summary(&self, key: &str) -> Result<PageSummary, ToolError> {
        let url = self.endpoint(&["api", "rest_v1", "page", "summary", key])?;
        let response = self.http.get(url).send().await?;
        Ok(check_status(response).await?.json().await?)
    }
}

#[async_trait]
impl KnowledgeSource for WikipediaSource {
    fn name(&self) -> &str {
        "wikipedia"
    }

    async fn lookup(&self, query: &str, k: usize) -> Result<Vec<Document>, ToolError> {
        if k == 0 {
            return Ok(Vec::new());
        }
        let pages = self.search(query, k).await?;
        let mut documents = Vec::with_capacity(pages.len());
        for page in pages.into_iter().take(k) {
            let summary = match self.summary(&page.key).await {
                Ok(summary) => summary,
                Err(err) => {
                    tracing::warn!(page = %page.title, error = %err, "wikipedia summary failed");
                    continue;
                }
            };
            if summary.extract.trim().is_empty() {
                continue;
            }
            let link = summary
                .content_urls
                .and_then(|urls| urls.desktop)
                .map(|desktop| desktop.page)
                .unwrap_or_else(|| "Wikipedia".to_string());
            documents.push(
                Document::new(page.key, summary.extract)
                    .with_metadata("source", link)
                    .with_metadata("title", summary.title),
            );
        }
        tracing::debug!(hits = documents.len(), "wikipedia lookup finished");
        Ok(documents)
    }
}
