//! Configuration types for a harvesting run.
//!
//! All policy constants live here and are passed explicitly into the
//! pipeline. Nothing downstream reads the environment.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{HarvestError, Result};
use crate::security::SecretString;

pub const OPENAI_API_KEY: &str = "OPENAI_API_KEY";
pub const TAVILY_API_KEY: &str = "TAVILY_API_KEY";

/// Configuration for the batched extraction loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Documents per extraction call. Default: 3.
    pub batch_size: usize,

    /// Per-document content cut-off in characters. Default: 3000.
    pub max_content_chars: usize,

    /// Hard ceiling on loop iterations. Default: 100.
    pub iteration_limit: usize,

    /// Known titles passed back to the model as a deduplication hint.
    ///
    /// The most recent titles are kept. Default: 50.
    pub max_hint_titles: usize,

    /// Run the post-loop enrichment call. Default: true.
    pub enrichment: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            batch_size: 3,
            max_content_chars: 3000,
            iteration_limit: 100,
            max_hint_titles: 50,
            enrichment: true,
        }
    }
}

/// Configuration for query generation, search and crawling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryConfig {
    /// Queries requested from the model. Default: 10.
    pub query_count: usize,

    /// Generated queries actually searched. Default: 5.
    pub max_queries: usize,

    /// Results requested per query. Default: 10.
    pub max_results_per_query: usize,

    /// Upper bound on pages crawled. Default: 20.
    pub max_crawl_urls: usize,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            query_count: 10,
            max_queries: 5,
            max_results_per_query: 10,
            max_crawl_urls: 20,
        }
    }
}

/// Model selection for the extraction backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Model that writes search queries. Default: gpt-4o.
    pub query_model: String,

    /// Model that extracts books from crawled text. Default: gpt-4o-mini.
    pub extraction_model: String,

    /// API base URL. Default: https://api.openai.com/v1.
    pub base_url: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            query_model: "gpt-4o".to_string(),
            extraction_model: "gpt-4o-mini".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
        }
    }
}

/// Complete configuration for a harvesting run.
#[derive(Debug, Clone)]
pub struct HarvestConfig {
    /// Extraction backend credential
    pub openai_api_key: SecretString,

    /// Search collaborator credential
    pub tavily_api_key: SecretString,

    pub batch: BatchConfig,
    pub discovery: DiscoveryConfig,
    pub models: ModelConfig,

    /// Catalog output path. Default: books.json.
    pub output_path: PathBuf,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            openai_api_key: SecretString::default(),
            tavily_api_key: SecretString::default(),
            batch: BatchConfig::default(),
            discovery: DiscoveryConfig::default(),
            models: ModelConfig::default(),
            output_path: PathBuf::from("books.json"),
        }
    }
}

impl HarvestConfig {
    /// Create a config with default policy and the given credentials.
    pub fn new(openai_api_key: impl Into<String>, tavily_api_key: impl Into<String>) -> Self {
        Self {
            openai_api_key: SecretString::new(openai_api_key),
            tavily_api_key: SecretString::new(tavily_api_key),
            ..Default::default()
        }
    }

    /// Load credentials and overrides from the environment.
    ///
    /// A `.env` file is honoured when present. Missing credentials are not an
    /// error here; [`HarvestConfig::validate`] reports them.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();

        let mut config = Self::new(
            std::env::var(OPENAI_API_KEY).unwrap_or_default(),
            std::env::var(TAVILY_API_KEY).unwrap_or_default(),
        );

        if let Ok(base_url) = std::env::var("OPENAI_BASE_URL") {
            config.models.base_url = base_url;
        }
        if let Ok(path) = std::env::var("BOOKSCOUT_OUTPUT") {
            config.output_path = PathBuf::from(path);
        }
        if let Ok(size) = std::env::var("BOOKSCOUT_BATCH_SIZE") {
            config.batch.batch_size = size.parse().map_err(|_| {
                HarvestError::invalid_config(format!(
                    "BOOKSCOUT_BATCH_SIZE must be a number, got {:?}",
                    size
                ))
            })?;
        }

        Ok(config)
    }

    /// Set the output path.
    pub fn with_output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_path = path.into();
        self
    }

    /// Set the batch size.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch.batch_size = batch_size;
        self
    }

    /// Set the iteration ceiling.
    pub fn with_iteration_limit(mut self, limit: usize) -> Self {
        self.batch.iteration_limit = limit;
        self
    }

    /// Enable or disable the enrichment step.
    pub fn with_enrichment(mut self, enabled: bool) -> Self {
        self.batch.enrichment = enabled;
        self
    }

    /// Set the extraction backend base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.models.base_url = url.into();
        self
    }

    /// Validate credentials and policy. Any error here is fatal.
    pub fn validate(&self) -> Result<()> {
        self.validate_extraction()?;
        self.tavily_api_key.require(TAVILY_API_KEY)?;

        if self.discovery.max_queries == 0 {
            return Err(HarvestError::invalid_config("max_queries must be > 0"));
        }
        if self.discovery.max_results_per_query == 0 {
            return Err(HarvestError::invalid_config(
                "max_results_per_query must be > 0",
            ));
        }

        Ok(())
    }

    /// Validate only what the extraction loop needs.
    pub fn validate_extraction(&self) -> Result<()> {
        self.openai_api_key.require(OPENAI_API_KEY)?;

        if self.batch.batch_size == 0 {
            return Err(HarvestError::invalid_config("batch_size must be > 0"));
        }
        if self.batch.iteration_limit == 0 {
            return Err(HarvestError::invalid_config("iteration_limit must be > 0"));
        }

        Ok(())
    }
}
