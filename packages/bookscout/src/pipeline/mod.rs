//! Harvesting pipeline.
//!
//! - `batch` - Slicing crawled documents into prompt-sized batches
//! - `extract` - Model output to normalized book records
//! - `dedupe` - Title/author deduplication
//! - `controller` - The batch loop state machine and enrichment
//! - `discover` - Query generation, search and crawl
//! - `harvest` - End-to-end run
//! - `prompts` - LLM prompt templates

pub mod batch;
pub mod controller;
pub mod dedupe;
pub mod discover;
pub mod extract;
pub mod harvest;
pub mod prompts;

pub use batch::{format_batch, has_more_batches, slice_batch, total_batches};
pub use controller::{BatchLoop, BatchState, LoopOutcome, LoopState};
pub use dedupe::{dedupe, dedupe_key};
pub use discover::{discover_documents, generate_queries, Discovery, QueryGenerator};
pub use extract::{normalize_book, ExtractionClient};
pub use harvest::{HarvestReport, Harvester};
