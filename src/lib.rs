//! Detail-controlled summarization of long documents
//!
//! A document is split on a delimiter, the pieces are greedily combined into
//! token-bounded chunks, and each chunk is summarized by a language model. The
//! `detail` setting picks how many chunks are used, and therefore how long the
//! joined summary is.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

/// Core types shared across modules.
///
/// Provides:
/// - Crate-level error and result types
/// - LLM request, response and client definitions
pub mod types;

/// Processing module for chunking and summarization.
///
/// Provides utilities for:
/// - Token counting
/// - Delimiter splitting and greedy chunk combination
/// - Detail-level resolution
/// - Chunk-by-chunk summarization
pub mod processing;

/// LLM module for language model operations.
///
/// Provides:
/// - OpenAI and Anthropic chat clients
/// - Provider selection from model identifiers
/// - Retry with exponential backoff
pub mod llm;

pub use types::{Error, Result};
pub use processing::summary::{
    ContentSummarizer,
    DocumentSummarizer,
    Summary,
    SummaryConfig,
    SummaryError,
    SummaryMetadata,
};
