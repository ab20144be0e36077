//! Typed errors for the harvesting library.
//!
//! Uses `thiserror` for library errors (not `anyhow`) so callers can tell
//! fatal startup problems apart from the recoverable ones the pipeline
//! absorbs on its own.

use thiserror::Error;

/// Errors that can occur while harvesting books.
#[derive(Debug, Error)]
pub enum HarvestError {
    /// A required credential is missing or blank
    #[error("missing credential: {name}")]
    MissingCredential { name: &'static str },

    /// Configuration failed validation
    #[error("invalid config: {reason}")]
    InvalidConfig { reason: String },

    /// Web search failed
    #[error("search failed: {0}")]
    Search(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Crawl operation failed
    #[error("crawl failed: {0}")]
    Crawl(#[from] CrawlError),

    /// AI service unavailable or failed
    #[error("AI service error: {0}")]
    AI(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// JSON parsing error
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// Writing the catalog failed
    #[error("persistence error: {0}")]
    Persist(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Filesystem error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl HarvestError {
    /// Whether this error must abort a run before any work begins.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            HarvestError::MissingCredential { .. } | HarvestError::InvalidConfig { .. }
        )
    }

    pub(crate) fn invalid_config(reason: impl Into<String>) -> Self {
        HarvestError::InvalidConfig {
            reason: reason.into(),
        }
    }
}

/// Errors that can occur while fetching a single page.
#[derive(Debug, Error)]
pub enum CrawlError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Invalid URL format
    #[error("invalid URL: {url}")]
    InvalidUrl { url: String },

    /// URL is on the noise blocklist
    #[error("blocked URL: {url}")]
    Blocked { url: String },

    /// Page fetched but carried no text
    #[error("empty content: {url}")]
    EmptyContent { url: String },

    /// Connection timeout
    #[error("timeout crawling: {url}")]
    Timeout { url: String },
}

/// Result type alias for harvesting operations.
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for crawl operations.
pub type CrawlResult<T> = std::result::Result<T, CrawlError>;
