//! Sink trait for persisting the final catalog.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::book::BookRecord;

/// Where and how much a sink wrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveReport {
    /// File path or other identifier of the written catalog
    pub location: String,

    /// Bytes of serialized output
    pub bytes_written: usize,

    /// Number of records written
    pub records: usize,
}

/// Persistence sink for deduplicated book records.
///
/// Implementations must replace any previous output as a whole: a failed
/// save never leaves a partial catalog behind.
#[async_trait]
pub trait BookSink: Send + Sync {
    async fn save(&self, books: &[BookRecord]) -> Result<SaveReport>;
}
