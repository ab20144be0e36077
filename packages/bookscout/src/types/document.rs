//! Crawled documents, the unit the batch loop slices.

use serde::{Deserialize, Serialize};

/// Title used when neither the search result nor the page has one.
pub const NO_TITLE: &str = "No title";

/// A crawled page paired with its search metadata.
///
/// Produced once by discovery and never mutated; sequence order defines
/// batch membership.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrawledDocument {
    pub url: String,
    pub title: String,
    pub content: String,
    /// Search relevance score (0.0 when the search API gave none)
    pub score: f64,
}

impl CrawledDocument {
    pub fn new(url: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: NO_TITLE.to_string(),
            content: content.into(),
            score: 0.0,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_score(mut self, score: f64) -> Self {
        self.score = score;
        self
    }
}
