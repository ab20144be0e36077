//! Page fetching.
//!
//! Discovery hands the ingestor search-result URLs and keeps whatever comes
//! back. A page that fails to load costs only itself.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::CrawlResult;

/// One fetched page, reduced to text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawPage {
    pub url: String,

    /// `<title>` of the page, when it had one
    pub title: Option<String>,

    /// Markdown-ish text
    pub content: String,

    pub content_type: Option<String>,
    pub fetched_at: DateTime<Utc>,
}

impl RawPage {
    pub fn new(url: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: None,
            content: content.into(),
            content_type: None,
            fetched_at: Utc::now(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// No text worth sending to the model.
    pub fn is_blank(&self) -> bool {
        self.content.trim().is_empty()
    }
}

/// Fetches pages by URL.
///
/// Implementations:
/// - `HttpIngestor` - Plain HTTP GET with HTML-to-text conversion
/// - `MockIngestor` - For testing
#[async_trait]
pub trait Ingestor: Send + Sync {
    /// Fetch one page.
    async fn fetch(&self, url: &str) -> CrawlResult<RawPage>;

    /// Pause between consecutive fetches in [`Ingestor::fetch_all`].
    fn politeness_delay(&self) -> Duration {
        Duration::ZERO
    }

    /// Fetch pages one after another, in order.
    ///
    /// Failed and blank pages are logged and left out, so the result may be
    /// shorter than `urls`.
    async fn fetch_all(&self, urls: &[String]) -> Vec<RawPage> {
        let mut pages = Vec::with_capacity(urls.len());
        let delay = self.politeness_delay();

        for (i, url) in urls.iter().enumerate() {
            if i > 0 && !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }

            match self.fetch(url).await {
                Ok(page) if page.is_blank() => debug!(url = %url, "Skipping blank page"),
                Ok(page) => pages.push(page),
                Err(e) => warn!(url = %url, error = %e, "Failed to fetch page"),
            }
        }

        pages
    }

    /// Name for logs.
    fn name(&self) -> &str {
        "unknown"
    }
}
