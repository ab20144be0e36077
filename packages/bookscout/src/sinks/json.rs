//! JSON file sink.
//!
//! Writes the catalog to a temporary file next to the target and renames it
//! into place, so readers see either the previous catalog or the new one.

use async_trait::async_trait;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::{HarvestError, Result};
use crate::traits::sink::{BookSink, SaveReport};
use crate::types::book::BookRecord;

/// Persists the catalog as a pretty-printed JSON array.
#[derive(Debug, Clone)]
pub struct JsonFileSink {
    path: PathBuf,
}

impl JsonFileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl BookSink for JsonFileSink {
    async fn save(&self, books: &[BookRecord]) -> Result<SaveReport> {
        let json = serde_json::to_string_pretty(books)?;
        let bytes_written = json.len();
        let path = self.path.clone();

        tokio::task::spawn_blocking(move || write_atomic(&path, json.as_bytes()))
            .await
            .map_err(|e| HarvestError::Persist(Box::new(e)))??;

        info!(
            path = %self.path.display(),
            records = books.len(),
            bytes = bytes_written,
            "Saved catalog"
        );

        Ok(SaveReport {
            location: self.path.display().to_string(),
            bytes_written,
            records: books.len(),
        })
    }
}

fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&dir)?;

    let mut tmp = tempfile::NamedTempFile::new_in(&dir)?;
    tmp.write_all(contents)?;
    tmp.as_file().sync_all()?;
    debug!(tmp = %tmp.path().display(), "Wrote temporary catalog");

    // A failed persist drops the temp file, which deletes it
    tmp.persist(path)
        .map_err(|e| HarvestError::Persist(Box::new(e.error)))?;

    Ok(())
}
