//! Scripted searcher for tests.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};

use crate::error::{HarvestError, Result};
use crate::traits::searcher::{SearchResult, WebSearcher};

/// Returns registered hits per query; unknown queries find nothing.
///
/// Clones share state.
#[derive(Default, Clone)]
pub struct MockWebSearcher {
    hits: Arc<RwLock<HashMap<String, Vec<SearchResult>>>>,
    failing: Arc<RwLock<HashSet<String>>>,
    queries: Arc<RwLock<Vec<String>>>,
}

impl MockWebSearcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_results(self, query: &str, results: Vec<SearchResult>) -> Self {
        self.hits.write().unwrap().insert(query.to_string(), results);
        self
    }

    /// Register bare URLs as hits. Unparseable strings are ignored.
    pub fn with_urls(self, query: &str, urls: &[&str]) -> Self {
        let results = urls.iter().filter_map(|u| SearchResult::parse(u)).collect();
        self.with_results(query, results)
    }

    pub fn with_failure(self, query: &str) -> Self {
        self.failing.write().unwrap().insert(query.to_string());
        self
    }

    /// Queries searched so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.queries.read().unwrap().clone()
    }
}

#[async_trait]
impl WebSearcher for MockWebSearcher {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchResult>> {
        self.queries.write().unwrap().push(query.to_string());

        if self.failing.read().unwrap().contains(query) {
            return Err(HarvestError::Search(
                format!("search for {:?} failed", query).into(),
            ));
        }

        let mut hits = self
            .hits
            .read()
            .unwrap()
            .get(query)
            .cloned()
            .unwrap_or_default();
        hits.truncate(max_results);
        Ok(hits)
    }
}
