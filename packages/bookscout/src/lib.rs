//! Technical Book Harvesting Library
//!
//! Finds technical books on the web and catalogs them: a model writes search
//! queries, search results are crawled, and the crawled text is fed to a
//! model in small batches that each return structured book records.
//!
//! # Pipeline
//!
//! ```text
//! queries → search → blocklist → crawl → batch loop → enrichment → dedupe → sink
//! ```
//!
//! The batch loop is the core: it slices crawled documents into fixed-size
//! batches, makes one extraction call per batch, accumulates the results and
//! stops when the documents run out (or at the iteration ceiling). Failed
//! calls count as empty batches and never stop the loop.
//!
//! # Usage
//!
//! ```rust,ignore
//! use bookscout::{Harvester, HarvestConfig, HttpIngestor, JsonFileSink, OpenAI, TavilyWebSearcher};
//!
//! let config = HarvestConfig::from_env()?;
//! let harvester = Harvester::new(
//!     config.clone(),
//!     OpenAI::from_config(&config)?,
//!     TavilyWebSearcher::with_secret(config.tavily_api_key.clone())?,
//!     HttpIngestor::new()?,
//!     JsonFileSink::new(&config.output_path),
//! );
//! let report = harvester.run().await?;
//! ```
//!
//! # Modules
//!
//! - [`traits`] - Core trait abstractions (AI, WebSearcher, Ingestor, BookSink)
//! - [`types`] - Book records, crawled documents, configuration
//! - [`pipeline`] - Batching, extraction, dedup, the loop controller, discovery
//! - [`ai`] - OpenAI implementation of the AI trait
//! - [`ingestors`] - Page fetching (HttpIngestor, MockIngestor)
//! - [`search`] - Web search backends (TavilyWebSearcher, MockWebSearcher)
//! - [`sinks`] - Catalog persistence (JsonFileSink, MemorySink)
//! - [`security`] - Credential handling and the noise blocklist
//! - [`testing`] - Mock implementations for testing

pub mod ai;
pub mod error;
pub mod ingestors;
pub mod pipeline;
pub mod search;
pub mod security;
pub mod sinks;
pub mod testing;
pub mod traits;
pub mod types;

// Re-export core types at crate root
pub use ai::OpenAI;
pub use error::{CrawlError, HarvestError, Result};
pub use ingestors::HttpIngestor;
pub use search::{MockWebSearcher, TavilyWebSearcher};
pub use security::{SecretString, UrlBlocklist};
pub use sinks::{JsonFileSink, MemorySink};
pub use traits::{
    ai::AI,
    ingestor::{Ingestor, RawPage},
    searcher::{SearchResult, WebSearcher},
    sink::{BookSink, SaveReport},
};
pub use types::{
    book::{BookRecord, Category, ExtractedBook},
    config::{BatchConfig, DiscoveryConfig, HarvestConfig, ModelConfig},
    document::CrawledDocument,
};

// Re-export pipeline components
pub use pipeline::{
    // Batching
    format_batch, has_more_batches, slice_batch, total_batches,
    // Loop
    BatchLoop, BatchState, LoopOutcome, LoopState,
    // Extraction and dedup
    dedupe, dedupe_key, normalize_book, ExtractionClient,
    // Discovery
    discover_documents, generate_queries, Discovery, QueryGenerator,
    // Orchestration
    HarvestReport, Harvester,
};
