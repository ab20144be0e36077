//! Discovery: search queries → search results → crawled documents.
//!
//! Every failure here is absorbed. A failed query is skipped, a blocklisted
//! URL is dropped, and a page that fails to crawl is left out. Discovery can
//! legitimately return no documents at all.

use std::collections::{HashMap, HashSet};
use tracing::{debug, info, warn};

use crate::pipeline::prompts::format_query_prompt;
use crate::security::UrlBlocklist;
use crate::traits::ai::AI;
use crate::traits::ingestor::{Ingestor, RawPage};
use crate::traits::searcher::{SearchResult, WebSearcher};
use crate::types::config::DiscoveryConfig;
use crate::types::document::{CrawledDocument, NO_TITLE};

/// Static search queries.
pub struct QueryGenerator;

impl QueryGenerator {
    /// Queries used when the model cannot produce any.
    pub fn technical_book_queries() -> Vec<String> {
        [
            "best software engineering books of all time",
            "must read books for software engineers",
            "best artificial intelligence books list",
            "best machine learning books for beginners and experts",
            "best system design books",
            "best software architecture books",
            "best algorithms and data structures books",
            "best programming books every developer should read",
            "best devops and cloud computing books",
            "best database design books",
        ]
        .into_iter()
        .map(String::from)
        .collect()
    }
}

/// What discovery found.
#[derive(Debug, Clone, Default)]
pub struct Discovery {
    /// Search results across all queries, before URL dedup
    pub search_results: usize,

    /// URLs dropped by the blocklist
    pub blocked: usize,

    /// URLs handed to the crawler
    pub crawled: usize,

    /// Successfully crawled documents, in search order
    pub documents: Vec<CrawledDocument>,
}

/// Ask the model for search queries.
///
/// Falls back to [`QueryGenerator::technical_book_queries`] when the call
/// fails or yields nothing usable.
pub async fn generate_queries<A: AI + ?Sized>(ai: &A, config: &DiscoveryConfig) -> Vec<String> {
    let prompt = format_query_prompt(config.query_count);

    let queries: Vec<String> = match ai.generate_queries(&prompt).await {
        Ok(raw) => raw.iter().filter_map(|q| clean_query(q)).collect(),
        Err(e) => {
            warn!(error = %e, "Query generation failed, using built-in queries");
            return QueryGenerator::technical_book_queries();
        }
    };

    if queries.is_empty() {
        warn!("Model returned no usable queries, using built-in queries");
        return QueryGenerator::technical_book_queries();
    }

    info!(count = queries.len(), "Generated search queries");
    queries
}

/// Strip surrounding quotes and whitespace; `None` if nothing is left.
pub fn clean_query(raw: &str) -> Option<String> {
    let cleaned = raw.trim().trim_matches(|c| c == '"' || c == '\'').trim();
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned.to_string())
    }
}

/// Search, filter and crawl.
pub async fn discover_documents<S, I>(
    searcher: &S,
    ingestor: &I,
    blocklist: &UrlBlocklist,
    queries: &[String],
    config: &DiscoveryConfig,
) -> Discovery
where
    S: WebSearcher + ?Sized,
    I: Ingestor + ?Sized,
{
    let mut results: Vec<SearchResult> = Vec::new();

    for query in queries.iter().take(config.max_queries) {
        match searcher.search(query, config.max_results_per_query).await {
            Ok(found) => {
                info!(query = %query, results = found.len(), "Search complete");
                results.extend(found);
            }
            Err(e) => warn!(query = %query, error = %e, "Search failed, skipping query"),
        }
    }

    let search_results = results.len();

    let mut seen = HashSet::new();
    let mut blocked = 0;
    let mut candidates: Vec<SearchResult> = Vec::new();

    for result in results {
        if !seen.insert(result.url.as_str().to_string()) {
            continue;
        }
        if blocklist.is_blocked(result.url.as_str()) {
            debug!(url = %result.url, "Skipping blocklisted URL");
            blocked += 1;
            continue;
        }
        candidates.push(result);
    }

    candidates.truncate(config.max_crawl_urls);
    let urls: Vec<String> = candidates.iter().map(|r| r.url.to_string()).collect();

    info!(
        search_results,
        unique_urls = seen.len(),
        blocked,
        to_crawl = urls.len(),
        ingestor = ingestor.name(),
        "Crawling search results"
    );

    let mut by_url: HashMap<String, RawPage> = ingestor
        .fetch_all(&urls)
        .await
        .into_iter()
        .map(|p| (p.url.clone(), p))
        .collect();

    let documents: Vec<CrawledDocument> = candidates
        .into_iter()
        .filter_map(|result| {
            let page = by_url.remove(result.url.as_str())?;
            Some(to_document(result, page))
        })
        .collect();

    info!(
        crawled = urls.len(),
        documents = documents.len(),
        "Discovery complete"
    );

    Discovery {
        search_results,
        blocked,
        crawled: urls.len(),
        documents,
    }
}

fn to_document(result: SearchResult, page: RawPage) -> CrawledDocument {
    let title = result
        .title
        .filter(|t| !t.trim().is_empty())
        .or(page.title.filter(|t| !t.trim().is_empty()))
        .unwrap_or_else(|| NO_TITLE.to_string());

    CrawledDocument::new(page.url, page.content)
        .with_title(title)
        .with_score(result.score.unwrap_or(0.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingestors::MockIngestor;
    use crate::testing::MockAI;
    use crate::search::MockWebSearcher;

    fn queries(list: &[&str]) -> Vec<String> {
        list.iter().map(|q| q.to_string()).collect()
    }

    #[tokio::test]
    async fn test_generate_queries_strips_quotes() {
        let ai = MockAI::new().with_queries(vec!["\"best rust books\"", "  ", "'system design'"]);

        let generated = generate_queries(&ai, &DiscoveryConfig::default()).await;

        assert_eq!(generated, vec!["best rust books", "system design"]);
    }

    #[tokio::test]
    async fn test_generate_queries_falls_back() {
        let failing = MockAI::new().with_query_failure();
        assert_eq!(
            generate_queries(&failing, &DiscoveryConfig::default()).await,
            QueryGenerator::technical_book_queries()
        );

        let empty = MockAI::new().with_queries(vec![]);
        assert_eq!(
            generate_queries(&empty, &DiscoveryConfig::default()).await,
            QueryGenerator::technical_book_queries()
        );
    }

    #[tokio::test]
    async fn test_discover_filters_and_crawls() {
        let searcher = MockWebSearcher::new()
            .with_results(
                "q1",
                vec![
                    SearchResult::parse("https://books.example.com/list")
                        .unwrap()
                        .with_title("Top 10 Books")
                        .with_score(0.9),
                    SearchResult::parse("https://www.youtube.com/watch?v=abc").unwrap(),
                    SearchResult::parse("https://blog.example.com/broken").unwrap(),
                ],
            )
            .with_results(
                "q2",
                vec![
                    SearchResult::parse("https://books.example.com/list").unwrap(),
                    SearchResult::parse("https://other.example.com/reads").unwrap(),
                ],
            )
            .with_failure("q3");

        let ingestor = MockIngestor::new()
            .with_page(RawPage::new("https://books.example.com/list", "SICP, Clean Code"))
            .with_page(
                RawPage::new("https://other.example.com/reads", "Refactoring")
                    .with_title("Reading List"),
            )
            .with_failure("https://blog.example.com/broken");

        let discovery = discover_documents(
            &searcher,
            &ingestor,
            &UrlBlocklist::new(),
            &queries(&["q1", "q2", "q3"]),
            &DiscoveryConfig::default(),
        )
        .await;

        assert_eq!(searcher.calls(), vec!["q1", "q2", "q3"]);
        assert_eq!(discovery.search_results, 5);
        assert_eq!(discovery.blocked, 1);
        assert_eq!(discovery.crawled, 3);
        assert!(!ingestor
            .fetch_calls()
            .iter()
            .any(|u| u.contains("youtube")));

        let docs = &discovery.documents;
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].url, "https://books.example.com/list");
        assert_eq!(docs[0].title, "Top 10 Books");
        assert_eq!(docs[0].score, 0.9);
        assert_eq!(docs[1].title, "Reading List");
        assert_eq!(docs[1].score, 0.0);
    }

    #[tokio::test]
    async fn test_discover_respects_limits() {
        let searcher = MockWebSearcher::new()
            .with_urls(
                "q1",
                &[
                    "https://a.example.com/1",
                    "https://a.example.com/2",
                    "https://a.example.com/3",
                ],
            )
            .with_urls("q2", &["https://b.example.com/1"]);
        let ingestor = MockIngestor::new()
            .with_page(RawPage::new("https://a.example.com/1", "one"))
            .with_page(RawPage::new("https://a.example.com/2", "two"))
            .with_page(RawPage::new("https://a.example.com/3", "three"));

        let config = DiscoveryConfig {
            max_queries: 1,
            max_results_per_query: 10,
            max_crawl_urls: 2,
            ..Default::default()
        };

        let discovery = discover_documents(
            &searcher,
            &ingestor,
            &UrlBlocklist::new(),
            &queries(&["q1", "q2"]),
            &config,
        )
        .await;

        assert_eq!(searcher.calls(), vec!["q1"]);
        assert_eq!(ingestor.fetch_call_count(), 2);
        assert_eq!(discovery.documents.len(), 2);
        assert_eq!(discovery.documents[0].title, NO_TITLE);
    }

    #[tokio::test]
    async fn test_discover_with_no_results() {
        let discovery = discover_documents(
            &MockWebSearcher::new(),
            &MockIngestor::new(),
            &UrlBlocklist::new(),
            &queries(&["nothing"]),
            &DiscoveryConfig::default(),
        )
        .await;

        assert!(discovery.documents.is_empty());
        assert_eq!(discovery.search_results, 0);
    }
}
