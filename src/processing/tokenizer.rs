use tiktoken_rs::CoreBPE;

use crate::processing::types::ChunkingError;

/// Maps text to a token count
///
/// Only the length of the token sequence matters here, so implementations are
/// free to count without materializing tokens.
pub trait Tokenizer: Send + Sync {
    /// Number of tokens `text` encodes to
    fn count_tokens(&self, text: &str) -> usize;
}

/// BPE tokenizer backed by `tiktoken-rs`
pub struct TiktokenTokenizer {
    bpe: CoreBPE,
}

impl TiktokenTokenizer {
    /// Tokenizer using the `cl100k_base` encoding
    pub fn new() -> Result<Self, ChunkingError> {
        let bpe = tiktoken_rs::cl100k_base()
            .map_err(|e| ChunkingError::TokenizationError(e.to_string()))?;
        Ok(Self { bpe })
    }

    /// Tokenizer matching `model`, falling back to `cl100k_base` for unknown models
    ///
    /// A `provider/` prefix on the model name is ignored.
    pub fn for_model(model: &str) -> Result<Self, ChunkingError> {
        let name = model.rsplit('/').next().unwrap_or(model);
        match tiktoken_rs::get_bpe_from_model(name) {
            Ok(bpe) => Ok(Self { bpe }),
            Err(_) => Self::new(),
        }
    }
}

impl Tokenizer for TiktokenTokenizer {
    fn count_tokens(&self, text: &str) -> usize {
        self.bpe.encode_with_special_tokens(text).len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cl100k_counts() {
        let tokenizer = TiktokenTokenizer::new().unwrap();
        assert_eq!(tokenizer.count_tokens(""), 0);
        assert_eq!(tokenizer.count_tokens("hello world"), 2);
    }

    #[test]
    fn test_unknown_model_falls_back() {
        let tokenizer = TiktokenTokenizer::for_model("anthropic/claude-3-5-haiku-latest").unwrap();
        assert_eq!(tokenizer.count_tokens("hello world"), 2);
    }
}
