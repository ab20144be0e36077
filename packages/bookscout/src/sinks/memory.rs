//! In-memory sink.

use async_trait::async_trait;
use std::sync::{Arc, RwLock};

use crate::error::Result;
use crate::traits::sink::{BookSink, SaveReport};
use crate::types::book::BookRecord;

/// Sink that keeps the most recently saved catalog.
///
/// Clones share storage.
#[derive(Default, Clone)]
pub struct MemorySink {
    saved: Arc<RwLock<Option<Vec<BookRecord>>>>,
    saves: Arc<RwLock<usize>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// The last saved catalog, if any save happened.
    pub fn saved(&self) -> Option<Vec<BookRecord>> {
        self.saved.read().unwrap().clone()
    }

    /// Number of completed saves.
    pub fn save_count(&self) -> usize {
        *self.saves.read().unwrap()
    }
}

#[async_trait]
impl BookSink for MemorySink {
    async fn save(&self, books: &[BookRecord]) -> Result<SaveReport> {
        let bytes_written = serde_json::to_vec_pretty(books)?.len();

        *self.saved.write().unwrap() = Some(books.to_vec());
        *self.saves.write().unwrap() += 1;

        Ok(SaveReport {
            location: "memory".to_string(),
            bytes_written,
            records: books.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_sink_replaces_previous() {
        let sink = MemorySink::new();
        assert!(sink.saved().is_none());

        sink.save(&[BookRecord::new("SICP", "Abelson")]).await.unwrap();
        let report = sink.save(&[]).await.unwrap();

        assert_eq!(report.records, 0);
        assert_eq!(sink.saved(), Some(Vec::new()));
        assert_eq!(sink.save_count(), 2);
    }
}
