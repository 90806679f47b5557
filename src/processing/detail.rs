use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::processing::chunking::{combine_chunks, split_on_delimiter, CombineConfig};
use crate::processing::summary::SummaryError;
use crate::processing::tokenizer::Tokenizer;

/// Inputs that determine how finely a document is chunked
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetailParameters {
    /// Summary granularity in `[0, 1]`; 0 summarizes the whole document at once
    pub detail: f64,
    /// Smallest chunk budget in tokens; also sets the finest possible chunking
    pub minimum_chunk_size: usize,
    /// Delimiter the document is split on
    pub delimiter: String,
}

/// Chunk budget derived from a detail level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailResolution {
    /// Chunk count obtained at `minimum_chunk_size`
    pub max_chunks: usize,
    /// Chunk count interpolated from the detail level
    pub chosen_chunk_count: usize,
    /// Token count of the whole document
    pub document_tokens: usize,
    /// Token budget per chunk for the real pass
    pub chunk_size: usize,
}

/// Maps a detail level to a chunk-size budget
///
/// `max_chunks` comes from a throwaway greedy pass at `minimum_chunk_size`.
/// The chosen chunk count interpolates linearly between 1 and `max_chunks` and
/// is truncated, so nearby detail levels can resolve to the same budget on
/// short documents.
pub fn resolve_chunk_size(
    text: &str,
    params: &DetailParameters,
    tokenizer: &dyn Tokenizer,
) -> Result<DetailResolution, SummaryError> {
    if !(0.0..=1.0).contains(&params.detail) {
        return Err(SummaryError::InvalidDetail(params.detail));
    }
    if params.minimum_chunk_size == 0 {
        return Err(SummaryError::InvalidConfig(
            "minimum_chunk_size must be positive".to_string(),
        ));
    }

    let pieces = split_on_delimiter(text, &params.delimiter);
    let counting_pass = CombineConfig {
        max_tokens: params.minimum_chunk_size,
        delimiter: params.delimiter.clone(),
        header: None,
        add_ellipsis_for_overflow: false,
    };
    let max_chunks = combine_chunks(&pieces, &counting_pass, tokenizer).chunks.len();

    let interpolated = 1.0 + params.detail * (max_chunks as f64 - 1.0);
    let chosen_chunk_count = (interpolated.floor() as usize).max(1);

    let document_tokens = tokenizer.count_tokens(text);
    let chunk_size = params
        .minimum_chunk_size
        .max(document_tokens / chosen_chunk_count);

    debug!(
        "Detail {} -> {} of {} chunks, {} token budget for {} document tokens",
        params.detail, chosen_chunk_count, max_chunks, chunk_size, document_tokens
    );

    Ok(DetailResolution {
        max_chunks,
        chosen_chunk_count,
        document_tokens,
        chunk_size,
    })
}
