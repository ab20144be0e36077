//! Testing utilities including mock implementations.
//!
//! These are useful for driving the batch loop and the full harvester
//! without making real AI or network calls.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, RwLock};

use crate::error::{HarvestError, Result};
use crate::traits::ai::AI;
use crate::types::book::ExtractedBook;

pub use crate::ingestors::MockIngestor;
pub use crate::sinks::MemorySink;
pub use crate::search::MockWebSearcher;

/// A scripted reply for one extraction call.
#[derive(Debug, Clone)]
enum ScriptedReply {
    Books(Vec<ExtractedBook>),
    Failure(String),
}

/// A mock AI implementation for testing.
///
/// Extraction replies are consumed in order, one per call. Once the script
/// runs out every further call returns no books. Clones share state, so a
/// test can keep a handle after moving the mock into the pipeline.
#[derive(Default, Clone)]
pub struct MockAI {
    /// Scripted extraction replies, front first
    extractions: Arc<RwLock<VecDeque<ScriptedReply>>>,

    /// Reply to query generation; `None` means fail
    queries: Arc<RwLock<Option<Vec<String>>>>,

    /// Call tracking for assertions
    calls: Arc<RwLock<Vec<MockAICall>>>,
}

/// Record of a call made to the mock AI.
#[derive(Debug, Clone, PartialEq)]
pub enum MockAICall {
    GenerateQueries { prompt: String },
    ExtractBooks { prompt: String },
}

impl MockAI {
    /// Create a new mock AI with an empty script.
    pub fn new() -> Self {
        Self {
            queries: Arc::new(RwLock::new(Some(Vec::new()))),
            ..Default::default()
        }
    }

    /// Queue the books returned by the next unscripted extraction call.
    pub fn with_books(self, books: Vec<ExtractedBook>) -> Self {
        self.extractions
            .write()
            .unwrap()
            .push_back(ScriptedReply::Books(books));
        self
    }

    /// Queue an extraction failure.
    pub fn with_extraction_failure(self, message: impl Into<String>) -> Self {
        self.extractions
            .write()
            .unwrap()
            .push_back(ScriptedReply::Failure(message.into()));
        self
    }

    /// Set the queries returned by query generation.
    pub fn with_queries(self, queries: Vec<&str>) -> Self {
        *self.queries.write().unwrap() = Some(queries.into_iter().map(String::from).collect());
        self
    }

    /// Make query generation fail.
    pub fn with_query_failure(self) -> Self {
        *self.queries.write().unwrap() = None;
        self
    }

    /// Get all calls made to this mock.
    pub fn calls(&self) -> Vec<MockAICall> {
        self.calls.read().unwrap().clone()
    }

    /// Prompts of every extraction call, in order.
    pub fn extraction_prompts(&self) -> Vec<String> {
        self.calls
            .read()
            .unwrap()
            .iter()
            .filter_map(|call| match call {
                MockAICall::ExtractBooks { prompt } => Some(prompt.clone()),
                _ => None,
            })
            .collect()
    }

    /// Number of extraction calls made.
    pub fn extraction_call_count(&self) -> usize {
        self.extraction_prompts().len()
    }

    /// Clear call history.
    pub fn clear_calls(&self) {
        self.calls.write().unwrap().clear();
    }
}

#[async_trait]
impl AI for MockAI {
    async fn generate_queries(&self, prompt: &str) -> Result<Vec<String>> {
        self.calls.write().unwrap().push(MockAICall::GenerateQueries {
            prompt: prompt.to_string(),
        });

        self.queries
            .read()
            .unwrap()
            .clone()
            .ok_or_else(|| HarvestError::AI("mock query generation failure".into()))
    }

    async fn extract_books(&self, prompt: &str) -> Result<Vec<ExtractedBook>> {
        self.calls.write().unwrap().push(MockAICall::ExtractBooks {
            prompt: prompt.to_string(),
        });

        match self.extractions.write().unwrap().pop_front() {
            Some(ScriptedReply::Books(books)) => Ok(books),
            Some(ScriptedReply::Failure(message)) => Err(HarvestError::AI(message.into())),
            None => Ok(Vec::new()),
        }
    }
}
