//! AI trait for LLM operations.
//!
//! The AI trait abstracts the two model capabilities the pipeline needs:
//! - Writing web search queries that surface book lists
//! - Structured extraction of book records from crawled text
//!
//! Implementations return errors freely; the extraction client decides which
//! failures the batch loop absorbs.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::book::ExtractedBook;

/// AI trait for LLM operations.
///
/// Implementations wrap specific LLM providers and handle the specifics of
/// prompting and response parsing.
#[async_trait]
pub trait AI: Send + Sync {
    /// Generate web search queries from a fully rendered prompt.
    async fn generate_queries(&self, prompt: &str) -> Result<Vec<String>>;

    /// Extract book records from a fully rendered prompt.
    ///
    /// Returns whatever the model produced, possibly empty. Fields the model
    /// left out stay `None`.
    async fn extract_books(&self, prompt: &str) -> Result<Vec<ExtractedBook>>;
}

#[async_trait]
impl<T: AI + ?Sized> AI for std::sync::Arc<T> {
    async fn generate_queries(&self, prompt: &str) -> Result<Vec<String>> {
        (**self).generate_queries(prompt).await
    }

    async fn extract_books(&self, prompt: &str) -> Result<Vec<ExtractedBook>> {
        (**self).extract_books(prompt).await
    }
}
