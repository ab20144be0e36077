//! Canned-page ingestor for tests.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};

use crate::error::{CrawlError, CrawlResult};
use crate::traits::ingestor::{Ingestor, RawPage};

/// Serves pages registered up front.
///
/// Unknown URLs fail like a 404, URLs marked with
/// [`MockIngestor::with_failure`] fail like a timeout. Every fetch is
/// recorded. Clones share state.
///
/// ```rust
/// use bookscout::ingestors::{MockIngestor, RawPage};
///
/// let mock = MockIngestor::new()
///     .with_page(RawPage::new("https://example.com/books", "# Books\n\nSICP"));
/// assert_eq!(mock.fetch_call_count(), 0);
/// ```
#[derive(Default, Clone)]
pub struct MockIngestor {
    pages: Arc<RwLock<HashMap<String, RawPage>>>,
    timeouts: Arc<RwLock<HashSet<String>>>,
    fetched: Arc<RwLock<Vec<String>>>,
}

impl MockIngestor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `page` at `page.url`.
    pub fn with_page(self, page: RawPage) -> Self {
        self.pages.write().unwrap().insert(page.url.clone(), page);
        self
    }

    /// Time out on `url`.
    pub fn with_failure(self, url: impl Into<String>) -> Self {
        self.timeouts.write().unwrap().insert(url.into());
        self
    }

    pub fn fetch_call_count(&self) -> usize {
        self.fetched.read().unwrap().len()
    }

    /// URLs requested so far, in order.
    pub fn fetch_calls(&self) -> Vec<String> {
        self.fetched.read().unwrap().clone()
    }
}

#[async_trait]
impl Ingestor for MockIngestor {
    async fn fetch(&self, url: &str) -> CrawlResult<RawPage> {
        self.fetched.write().unwrap().push(url.to_string());

        if self.timeouts.read().unwrap().contains(url) {
            return Err(CrawlError::Timeout {
                url: url.to_string(),
            });
        }

        let page = self.pages.read().unwrap().get(url).cloned();
        page.ok_or_else(|| CrawlError::Http(format!("{} returned 404 Not Found", url).into()))
    }

    fn name(&self) -> &str {
        "mock"
    }
}
