mod llm;

pub use llm::{DocumentSummarizer, SummaryPlan, SYSTEM_PROMPT};

use thiserror::Error;
use serde::{Deserialize, Serialize};
use async_trait::async_trait;

use crate::llm::{LLMError, LLMParams, RetryConfig};
use crate::processing::detail::DetailResolution;

/// Errors that can occur during summary generation
#[derive(Error, Debug)]
pub enum SummaryError {
    /// Detail level outside `[0, 1]`
    #[error("Invalid detail {0}: must lie in [0, 1]")]
    InvalidDetail(f64),
    /// Configuration that cannot produce a summary
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    /// The model call for one chunk failed after retries
    #[error("Summarizing chunk {index} failed: {source}")]
    ChunkFailed {
        /// Position of the chunk in the chunk sequence
        index: usize,
        /// Underlying model error
        #[source]
        source: LLMError,
    },
}

/// Configuration for detail-controlled summarization
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SummaryConfig {
    /// Summary granularity in `[0, 1]`
    pub detail: f64,
    /// Model identifier passed to the client, optionally `provider/model`
    pub model: String,
    /// Extra instructions appended to the system prompt
    pub additional_instructions: Option<String>,
    /// Floor on the per-chunk token budget
    pub minimum_chunk_size: usize,
    /// Delimiter the document is split on and chunks are joined with
    pub chunk_delimiter: String,
    /// Feed all previous partial summaries into each request
    pub summarize_recursively: bool,
    /// Log chunk counts and lengths at info level
    pub verbose: bool,
    /// Maximum in-flight requests in independent mode
    pub max_concurrency: usize,
    /// Deadline per model call, in seconds
    pub request_timeout_secs: Option<u64>,
    /// Retry policy per model call
    pub retry: RetryConfig,
    /// Sampling parameters for every request
    pub llm_params: LLMParams,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            detail: 0.0,
            model: "gpt-4-turbo".to_string(),
            additional_instructions: None,
            minimum_chunk_size: 500,
            chunk_delimiter: ".".to_string(),
            summarize_recursively: false,
            verbose: false,
            max_concurrency: 4,
            request_timeout_secs: None,
            retry: RetryConfig::default(),
            llm_params: LLMParams::default(),
        }
    }
}

impl SummaryConfig {
    /// Default configuration overridden by `SUMMARY_*` environment variables
    ///
    /// Unparsable values are ignored.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(detail) = std::env::var("SUMMARY_DETAIL") {
            if let Ok(detail) = detail.parse() {
                config.detail = detail;
            }
        }
        if let Ok(model) = std::env::var("SUMMARY_MODEL") {
            config.model = model;
        }
        if let Ok(instructions) = std::env::var("SUMMARY_INSTRUCTIONS") {
            config.additional_instructions = Some(instructions);
        }
        if let Ok(size) = std::env::var("SUMMARY_MIN_CHUNK_SIZE") {
            if let Ok(size) = size.parse() {
                config.minimum_chunk_size = size;
            }
        }
        if let Ok(delimiter) = std::env::var("SUMMARY_CHUNK_DELIMITER") {
            config.chunk_delimiter = delimiter;
        }
        if let Ok(recursive) = std::env::var("SUMMARY_RECURSIVE") {
            if let Ok(recursive) = recursive.parse() {
                config.summarize_recursively = recursive;
            }
        }
        if let Ok(verbose) = std::env::var("SUMMARY_VERBOSE") {
            if let Ok(verbose) = verbose.parse() {
                config.verbose = verbose;
            }
        }
        if let Ok(concurrency) = std::env::var("SUMMARY_MAX_CONCURRENCY") {
            if let Ok(concurrency) = concurrency.parse() {
                config.max_concurrency = concurrency;
            }
        }
        if let Ok(timeout) = std::env::var("SUMMARY_TIMEOUT_SECS") {
            if let Ok(secs) = timeout.parse() {
                config.request_timeout_secs = Some(secs);
            }
        }

        config
    }

    /// Check caller-supplied values before any chunking or model calls
    pub fn validate(&self) -> Result<(), SummaryError> {
        if !(0.0..=1.0).contains(&self.detail) {
            return Err(SummaryError::InvalidDetail(self.detail));
        }
        if self.minimum_chunk_size == 0 {
            return Err(SummaryError::InvalidConfig(
                "minimum_chunk_size must be positive".to_string(),
            ));
        }
        if self.chunk_delimiter.is_empty() {
            return Err(SummaryError::InvalidConfig(
                "chunk_delimiter must not be empty".to_string(),
            ));
        }
        if self.max_concurrency == 0 {
            return Err(SummaryError::InvalidConfig(
                "max_concurrency must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Metadata about the generated summary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryMetadata {
    /// How the detail level was turned into a chunk budget
    pub resolution: DetailResolution,
    /// Number of chunks sent to the model
    pub chunk_count: usize,
    /// Pieces excluded because they overflowed the budget alone
    pub dropped_count: usize,
    /// Per-chunk summaries in document order
    pub partial_summaries: Vec<String>,
    /// Tokens reported by the model across all requests
    pub tokens_used: usize,
}

/// A generated summary with metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Summary {
    /// The summary text
    pub text: String,
    /// Metadata about the summary
    pub metadata: SummaryMetadata,
}

/// Trait for content summarization
#[async_trait]
pub trait ContentSummarizer: Send + Sync {
    /// Generate a summary of the given content
    async fn generate_summary(&self, content: &str) -> Result<Summary, SummaryError>;

    /// Get the current configuration
    fn get_config(&self) -> &SummaryConfig;
}
