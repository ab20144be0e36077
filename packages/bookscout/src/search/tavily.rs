//! Tavily search API client.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;
use url::Url;

use crate::error::{HarvestError, Result};
use crate::security::SecretString;
use crate::traits::searcher::{SearchResult, WebSearcher};
use crate::types::config::TAVILY_API_KEY;

#[derive(Serialize)]
struct SearchRequest<'a> {
    query: &'a str,
    search_depth: &'static str,
    max_results: usize,
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<Hit>,
}

#[derive(Deserialize)]
struct Hit {
    url: String,
    title: Option<String>,
    content: Option<String>,
    score: Option<f64>,
}

impl Hit {
    fn into_result(self) -> Option<SearchResult> {
        let url = Url::parse(&self.url).ok()?;
        Some(SearchResult {
            url,
            title: self.title.filter(|t| !t.trim().is_empty()),
            snippet: self.content,
            score: self.score,
        })
    }
}

/// Searches with Tavily's `/search` endpoint, basic depth.
pub struct TavilyWebSearcher {
    client: reqwest::Client,
    api_key: SecretString,
    base_url: String,
}

impl TavilyWebSearcher {
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_secret(SecretString::new(api_key))
    }

    /// Build from a configured key. A blank key is a missing credential.
    pub fn with_secret(api_key: SecretString) -> Result<Self> {
        api_key.require(TAVILY_API_KEY)?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| HarvestError::Search(Box::new(e)))?;

        Ok(Self {
            client,
            api_key,
            base_url: "https://api.tavily.com".to_string(),
        })
    }

    /// Point at a different host (proxies, tests).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }
}

#[async_trait]
impl WebSearcher for TavilyWebSearcher {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchResult>> {
        debug!(query = %query, max_results, "Tavily search");

        let response = self
            .client
            .post(format!("{}/search", self.base_url))
            .bearer_auth(self.api_key.expose().trim())
            .json(&SearchRequest {
                query,
                search_depth: "basic",
                max_results,
            })
            .send()
            .await
            .map_err(|e| HarvestError::Search(Box::new(e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(HarvestError::Search(
                format!("Tavily returned {}: {}", status, body).into(),
            ));
        }

        let parsed: SearchResponse = response
            .json()
            .await
            .map_err(|e| HarvestError::Search(Box::new(e)))?;

        Ok(parsed
            .results
            .into_iter()
            .filter_map(Hit::into_result)
            .take(max_results)
            .collect())
    }
}
