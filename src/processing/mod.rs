//! Document processing functionality
//!
//! This module provides the pieces that turn a long document into a summary:
//! - Token counting
//! - Delimiter splitting and greedy chunk combination
//! - Detail-level resolution
//! - Chunk-by-chunk summarization

mod chunking;
mod types;

/// Token counting behind a small trait, with a tiktoken implementation.
pub mod tokenizer;

/// Detail level to chunk budget resolution.
pub mod detail;

/// LLM-driven summarization over combined chunks.
///
/// This module provides functionality for:
/// - Resolving a detail level into a chunk plan
/// - Building system and user prompts, optionally recursive
/// - Dispatching chunk requests with retries and timeouts
/// - Joining partial summaries in document order
pub mod summary;

pub use chunking::{
    CombineConfig,
    chunk_on_delimiter,
    combine_chunks,
    split_on_delimiter,
};

pub use types::{
    ChunkingError,
    CombineResult,
    CombinedChunk,
    OVERFLOW_MARKER,
};

pub use tokenizer::{TiktokenTokenizer, Tokenizer};

pub use detail::{resolve_chunk_size, DetailParameters, DetailResolution};
