//! End-to-end harvesting run.

use std::sync::Arc;
use tracing::info;

use crate::error::Result;
use crate::pipeline::controller::BatchLoop;
use crate::pipeline::dedupe::dedupe;
use crate::pipeline::discover::{discover_documents, generate_queries};
use crate::security::UrlBlocklist;
use crate::traits::ai::AI;
use crate::traits::ingestor::Ingestor;
use crate::traits::searcher::WebSearcher;
use crate::traits::sink::{BookSink, SaveReport};
use crate::types::book::BookRecord;
use crate::types::config::HarvestConfig;

/// Summary of a completed run.
#[derive(Debug, Clone)]
pub struct HarvestReport {
    /// Queries produced by the model (or the built-in fallback)
    pub queries: Vec<String>,

    /// Search results across the searched queries
    pub search_results: usize,

    /// Documents successfully crawled
    pub documents: usize,

    pub batches_processed: usize,
    pub empty_batches: usize,
    pub enrichment_books: usize,

    /// Records before deduplication
    pub books_extracted: usize,
    pub duplicates_removed: usize,

    /// The persisted catalog
    pub books: Vec<BookRecord>,
    pub saved: SaveReport,
}

/// Wires discovery, the batch loop and a sink into one run.
pub struct Harvester<A, S, I, K>
where
    A: AI,
    S: WebSearcher,
    I: Ingestor,
    K: BookSink,
{
    config: HarvestConfig,
    ai: Arc<A>,
    searcher: S,
    ingestor: I,
    sink: K,
    blocklist: UrlBlocklist,
}

impl<A, S, I, K> Harvester<A, S, I, K>
where
    A: AI,
    S: WebSearcher,
    I: Ingestor,
    K: BookSink,
{
    pub fn new(config: HarvestConfig, ai: A, searcher: S, ingestor: I, sink: K) -> Self {
        Self {
            config,
            ai: Arc::new(ai),
            searcher,
            ingestor,
            sink,
            blocklist: UrlBlocklist::new(),
        }
    }

    /// Replace the default noise blocklist.
    pub fn with_blocklist(mut self, blocklist: UrlBlocklist) -> Self {
        self.blocklist = blocklist;
        self
    }

    pub fn config(&self) -> &HarvestConfig {
        &self.config
    }

    /// Run the whole pipeline.
    ///
    /// Configuration errors are returned before any network call and leave
    /// the sink untouched. A failed save is returned as well; everything
    /// else is absorbed along the way.
    pub async fn run(&self) -> Result<HarvestReport> {
        self.config.validate()?;
        let batch_loop = BatchLoop::new(&self.config, Arc::clone(&self.ai))?;

        let queries = generate_queries(self.ai.as_ref(), &self.config.discovery).await;

        let discovery = discover_documents(
            &self.searcher,
            &self.ingestor,
            &self.blocklist,
            &queries,
            &self.config.discovery,
        )
        .await;

        let mut outcome = batch_loop.run(&discovery.documents).await;
        batch_loop.enrich(&mut outcome).await;

        let books_extracted = outcome.books.len();
        let (books, duplicates_removed) = dedupe(outcome.books);

        info!(
            books_extracted,
            duplicates_removed,
            unique_books = books.len(),
            "Deduplicated catalog"
        );

        let saved = self.sink.save(&books).await?;

        info!(
            location = %saved.location,
            records = saved.records,
            bytes = saved.bytes_written,
            "Harvest complete"
        );

        Ok(HarvestReport {
            queries,
            search_results: discovery.search_results,
            documents: discovery.documents.len(),
            batches_processed: outcome.batches_processed,
            empty_batches: outcome.empty_batches,
            enrichment_books: outcome.enrichment_books,
            books_extracted,
            duplicates_removed,
            books,
            saved,
        })
    }
}
