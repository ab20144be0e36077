//! Web search.
//!
//! Discovery only reads the ordered hit list: no pagination, no retries. A
//! failed query is skipped by the caller.

use async_trait::async_trait;
use url::Url;

use crate::error::Result;

/// One search hit.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    pub url: Url,
    pub title: Option<String>,

    /// Text excerpt the search API matched on
    pub snippet: Option<String>,

    /// Relevance, when the API reports one
    pub score: Option<f64>,
}

impl SearchResult {
    pub fn new(url: Url) -> Self {
        Self {
            url,
            title: None,
            snippet: None,
            score: None,
        }
    }

    /// `None` for strings that are not absolute URLs.
    pub fn parse(url: &str) -> Option<Self> {
        Url::parse(url).ok().map(Self::new)
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_score(mut self, score: f64) -> Self {
        self.score = Some(score);
        self
    }
}

/// Web search backend.
///
/// Implementations:
/// - `TavilyWebSearcher` - Tavily search API
/// - `MockWebSearcher` - For testing
#[async_trait]
pub trait WebSearcher: Send + Sync {
    /// At most `max_results` hits for `query`, best first.
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchResult>>;
}
