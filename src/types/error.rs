//! Crate-level error type

use thiserror::Error;
use crate::llm::LLMError;
use crate::processing::ChunkingError;
use crate::processing::summary::SummaryError;

/// Top-level error for callers that do not care which stage failed
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input errors
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Chunking errors
    #[error("Chunking error: {0}")]
    Chunking(#[from] ChunkingError),

    /// Summarization errors
    #[error("Summary error: {0}")]
    Summary(SummaryError),

    /// LLM errors
    #[error("LLM error: {0}")]
    LLM(#[from] LLMError),
}

/// Result alias using the crate-level [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

impl From<SummaryError> for Error {
    fn from(err: SummaryError) -> Self {
        match err {
            SummaryError::InvalidDetail(detail) => {
                Error::InvalidInput(format!("detail must lie in [0, 1], got {}", detail))
            }
            SummaryError::InvalidConfig(msg) => Error::Config(msg),
            other => Error::Summary(other),
        }
    }
}
