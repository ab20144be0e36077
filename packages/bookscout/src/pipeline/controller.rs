//! The batch loop controller.
//!
//! Drives extraction across consecutive batches of crawled documents:
//!
//! ```text
//! Running(i, books) --step--> Running(i+1, books ++ batch_i)   if batch i+1 exists
//!                    --step--> Done(i+1, books ++ batch_i)      otherwise
//! ```
//!
//! Accumulated records only grow while the loop runs. Deduplication is left
//! to the caller, after [`BatchLoop::enrich`].

use std::collections::HashSet;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::pipeline::batch::{format_batch, has_more_batches, slice_batch, total_batches};
use crate::pipeline::extract::ExtractionClient;
use crate::pipeline::prompts::{format_enrichment_prompt, format_extraction_prompt};
use crate::traits::ai::AI;
use crate::types::book::{BookRecord, Category};
use crate::types::config::{BatchConfig, HarvestConfig};
use crate::types::document::CrawledDocument;

/// Accumulated records and the index of the next batch to process.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchState {
    pub books: Vec<BookRecord>,
    pub batch_index: usize,
}

/// Loop state.
#[derive(Debug, Clone, PartialEq)]
pub enum LoopState {
    /// More batches remain
    Running(BatchState),

    /// Every batch has been processed
    Done(BatchState),
}

impl LoopState {
    /// Starting state for a document list. Empty input is done immediately.
    pub fn initial(documents: &[CrawledDocument]) -> Self {
        if documents.is_empty() {
            LoopState::Done(BatchState::default())
        } else {
            LoopState::Running(BatchState::default())
        }
    }

    pub fn is_done(&self) -> bool {
        matches!(self, LoopState::Done(_))
    }

    pub fn state(&self) -> &BatchState {
        match self {
            LoopState::Running(s) | LoopState::Done(s) => s,
        }
    }

    pub fn into_state(self) -> BatchState {
        match self {
            LoopState::Running(s) | LoopState::Done(s) => s,
        }
    }
}

/// Result of running the loop (and optionally enrichment).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoopOutcome {
    /// Every record accumulated, duplicates included
    pub books: Vec<BookRecord>,

    /// Batches the loop stepped through
    pub batches_processed: usize,

    /// Batches that contributed no records, failed calls included
    pub empty_batches: usize,

    /// Records added by the enrichment call
    pub enrichment_books: usize,

    /// Whether the loop stopped at the iteration ceiling
    pub hit_iteration_limit: bool,
}

/// Batched extraction loop over an AI backend.
pub struct BatchLoop<A: AI> {
    config: BatchConfig,
    client: ExtractionClient<A>,
}

impl<A: AI> BatchLoop<A> {
    /// Create a loop after validating the configuration.
    ///
    /// A missing model credential or a zero batch size / iteration limit is
    /// fatal and reported before any batch runs.
    pub fn new(config: &HarvestConfig, ai: A) -> Result<Self> {
        config.validate_extraction()?;

        Ok(Self {
            config: config.batch.clone(),
            client: ExtractionClient::new(ai),
        })
    }

    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    /// Process the batch at `state.batch_index` and advance.
    pub async fn step(&self, documents: &[CrawledDocument], state: BatchState) -> LoopState {
        let BatchState {
            mut books,
            batch_index,
        } = state;
        let total = total_batches(documents, self.config.batch_size);

        let batch = slice_batch(documents, batch_index, self.config.batch_size);
        let hint = known_titles(&books, self.config.max_hint_titles);
        let prompt = format_extraction_prompt(
            books.len(),
            &hint,
            &format_batch(batch, self.config.max_content_chars),
        );

        debug!(
            batch = batch_index + 1,
            total_batches = total,
            documents = batch.len(),
            prompt_len = prompt.len(),
            "Extracting batch"
        );

        let found = match self.client.try_extract(&prompt).await {
            Ok(found) => found,
            Err(e) => {
                warn!(
                    batch = batch_index + 1,
                    error = %e,
                    "Batch extraction failed, continuing with no books"
                );
                Vec::new()
            }
        };

        let found_count = found.len();
        books.extend(found);

        info!(
            batch = batch_index + 1,
            total_batches = total,
            found = found_count,
            total_books = books.len(),
            "Processed batch"
        );

        let more = has_more_batches(batch_index, documents, self.config.batch_size);
        let next = BatchState {
            books,
            batch_index: batch_index + 1,
        };

        if more {
            LoopState::Running(next)
        } else {
            LoopState::Done(next)
        }
    }

    /// Step through every batch, bounded by the iteration ceiling.
    pub async fn run(&self, documents: &[CrawledDocument]) -> LoopOutcome {
        info!(
            documents = documents.len(),
            batches = total_batches(documents, self.config.batch_size),
            batch_size = self.config.batch_size,
            "Starting batch loop"
        );

        let mut state = LoopState::initial(documents);
        let mut iterations = 0;
        let mut empty_batches = 0;
        let mut hit_iteration_limit = false;

        let final_state = loop {
            let current = match state {
                LoopState::Done(s) => break s,
                LoopState::Running(s) => s,
            };

            if iterations >= self.config.iteration_limit {
                warn!(
                    iteration_limit = self.config.iteration_limit,
                    batch_index = current.batch_index,
                    "Iteration limit reached, stopping batch loop"
                );
                hit_iteration_limit = true;
                break current;
            }

            let before = current.books.len();
            state = self.step(documents, current).await;
            iterations += 1;

            if state.state().books.len() == before {
                empty_batches += 1;
            }
        };

        LoopOutcome {
            batches_processed: final_state.batch_index,
            books: final_state.books,
            empty_batches,
            enrichment_books: 0,
            hit_iteration_limit,
        }
    }

    /// One supplementary extraction call for under-represented categories.
    ///
    /// Does nothing when enrichment is disabled. Appends without dedup.
    pub async fn enrich(&self, outcome: &mut LoopOutcome) {
        if !self.config.enrichment {
            debug!("Enrichment disabled");
            return;
        }

        let tally = category_tally(&outcome.books);
        let hint = known_titles(&outcome.books, self.config.max_hint_titles);
        let prompt = format_enrichment_prompt(outcome.books.len(), &tally, &hint);

        let found = self.client.extract(&prompt).await;
        outcome.enrichment_books = found.len();
        outcome.books.extend(found);

        info!(
            found = outcome.enrichment_books,
            total_books = outcome.books.len(),
            "Enrichment complete"
        );
    }
}

/// Book count for every category, in declaration order.
pub fn category_tally(books: &[BookRecord]) -> Vec<(Category, usize)> {
    Category::ALL
        .iter()
        .map(|category| {
            let count = books.iter().filter(|b| b.category == *category).count();
            (*category, count)
        })
        .collect()
}

/// The most recent distinct titles, oldest first, at most `limit` of them.
pub fn known_titles(books: &[BookRecord], limit: usize) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut titles: Vec<String> = books
        .iter()
        .rev()
        .filter(|b| seen.insert(b.title.to_lowercase()))
        .take(limit)
        .map(|b| b.title.clone())
        .collect();
    titles.reverse();
    titles
}
