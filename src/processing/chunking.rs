use std::iter;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::processing::tokenizer::Tokenizer;
use crate::processing::types::{CombineResult, CombinedChunk, OVERFLOW_MARKER};

/// Configuration for combining pieces into token-bounded chunks
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CombineConfig {
    /// Maximum number of tokens per combined chunk
    pub max_tokens: usize,
    /// String placed between pieces when they are joined
    pub delimiter: String,
    /// Text prefixed to every chunk; counts toward the budget
    pub header: Option<String>,
    /// Whether to leave a `...` marker where an oversized piece was dropped
    pub add_ellipsis_for_overflow: bool,
}

impl Default for CombineConfig {
    fn default() -> Self {
        Self {
            max_tokens: 500,
            delimiter: ".".to_string(),
            header: None,
            add_ellipsis_for_overflow: false,
        }
    }
}

/// Splits text into atomic pieces on every literal occurrence of `delimiter`
///
/// The delimiter is removed from the pieces. An empty document yields a single
/// empty piece, and an empty delimiter yields the whole text as one piece.
pub fn split_on_delimiter<'a>(text: &'a str, delimiter: &str) -> Vec<&'a str> {
    if delimiter.is_empty() {
        return vec![text];
    }
    text.split(delimiter).collect()
}

/// The chunk currently being filled
struct Candidate<'a> {
    parts: Vec<&'a str>,
    has_header: bool,
    piece_indices: Vec<usize>,
    overflow_markers: usize,
    token_count: usize,
}

impl<'a> Candidate<'a> {
    fn new(header: Option<&'a str>) -> Self {
        Self {
            parts: header.into_iter().collect(),
            has_header: header.is_some(),
            piece_indices: Vec::new(),
            overflow_markers: 0,
            token_count: 0,
        }
    }

    /// Text of the candidate with `extra` appended, without modifying it
    fn joined_with(&self, extra: &str, delimiter: &str) -> String {
        if self.parts.is_empty() {
            return extra.to_string();
        }
        let mut joined = self.parts.join(delimiter);
        joined.push_str(delimiter);
        joined.push_str(extra);
        joined
    }

    fn push_piece(&mut self, index: usize, piece: &'a str, token_count: usize) {
        self.parts.push(piece);
        self.piece_indices.push(index);
        self.token_count = token_count;
    }

    fn push_marker(&mut self, token_count: usize) {
        self.parts.push(OVERFLOW_MARKER);
        self.overflow_markers += 1;
        self.token_count = token_count;
    }

    fn has_content(&self) -> bool {
        self.parts.len() > usize::from(self.has_header)
    }

    fn finish(self, delimiter: &str) -> CombinedChunk {
        CombinedChunk {
            text: self.parts.join(delimiter),
            piece_indices: self.piece_indices,
            token_count: self.token_count,
            overflow_markers: self.overflow_markers,
        }
    }
}

/// Greedily combines consecutive pieces into chunks of at most `config.max_tokens` tokens
///
/// Single left-to-right pass; pieces are never reordered and a chunk is closed
/// as soon as the next piece would push it over budget. This is not optimal
/// packing, and chunk counts derived from it rely on it staying greedy.
///
/// A piece that exceeds the budget even alone (with the header) is dropped and
/// counted in [`CombineResult::dropped_count`]. With
/// `add_ellipsis_for_overflow`, a `...` marker takes its place if the marker
/// still fits in the current chunk.
pub fn combine_chunks(
    pieces: &[&str],
    config: &CombineConfig,
    tokenizer: &dyn Tokenizer,
) -> CombineResult {
    let delimiter = config.delimiter.as_str();
    let header = config.header.as_deref();
    let mut result = CombineResult::default();
    let mut candidate = Candidate::new(header);

    for (index, &piece) in pieces.iter().enumerate() {
        let alone = header
            .into_iter()
            .chain(iter::once(piece))
            .collect::<Vec<_>>()
            .join(delimiter);
        let alone_tokens = tokenizer.count_tokens(&alone);

        if alone_tokens > config.max_tokens {
            debug!(
                "Piece {} has {} tokens, over the {} token budget; dropping it",
                index, alone_tokens, config.max_tokens
            );
            result.dropped_count += 1;
            if config.add_ellipsis_for_overflow {
                let with_marker = tokenizer.count_tokens(&candidate.joined_with(OVERFLOW_MARKER, delimiter));
                if with_marker <= config.max_tokens {
                    candidate.push_marker(with_marker);
                }
            }
            continue;
        }

        let extended_tokens = tokenizer.count_tokens(&candidate.joined_with(piece, delimiter));
        if extended_tokens > config.max_tokens {
            let finished = std::mem::replace(&mut candidate, Candidate::new(header));
            result.chunks.push(finished.finish(delimiter));
            candidate.push_piece(index, piece, alone_tokens);
        } else {
            candidate.push_piece(index, piece, extended_tokens);
        }
    }

    if candidate.has_content() {
        result.chunks.push(candidate.finish(delimiter));
    }

    result
}

/// Splits `text` on `delimiter` and combines the pieces under `max_tokens`
///
/// Oversized pieces are replaced by `...` where possible. Dropped pieces are
/// reported through a warning and the returned count.
pub fn chunk_on_delimiter(
    text: &str,
    max_tokens: usize,
    delimiter: &str,
    tokenizer: &dyn Tokenizer,
) -> CombineResult {
    let pieces = split_on_delimiter(text, delimiter);
    let config = CombineConfig {
        max_tokens,
        delimiter: delimiter.to_string(),
        header: None,
        add_ellipsis_for_overflow: true,
    };
    let result = combine_chunks(&pieces, &config, tokenizer);

    if result.dropped_count > 0 {
        warn!(
            "{} chunks were dropped due to overflow (budget {} tokens)",
            result.dropped_count, max_tokens
        );
    }
    debug!(
        "Combined {} pieces into {} chunks with a {} token budget",
        pieces.len(),
        result.chunks.len(),
        max_tokens
    );

    result
}
