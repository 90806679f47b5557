use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Marker appended to a candidate chunk in place of a piece that could not fit
pub const OVERFLOW_MARKER: &str = "...";

/// A token-bounded run of consecutive pieces, joined by the delimiter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombinedChunk {
    /// Joined text, including the header when one was configured
    pub text: String,
    /// Positions of the pieces in the split sequence, in original order
    pub piece_indices: Vec<usize>,
    /// Number of tokens in `text`
    pub token_count: usize,
    /// Number of overflow markers standing in for dropped pieces
    pub overflow_markers: usize,
}

/// Output of a single combine pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombineResult {
    /// Combined chunks in document order
    pub chunks: Vec<CombinedChunk>,
    /// Pieces that exceeded the budget on their own and were left out
    pub dropped_count: usize,
}

/// Errors that can occur during text chunking
#[derive(Error, Debug)]
pub enum ChunkingError {
    /// Error during tokenization
    #[error("Tokenization error: {0}")]
    TokenizationError(String),
}
