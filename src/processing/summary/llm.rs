use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use crate::llm::{retry_with_backoff, LLMClient, LLMError, LLMParams, LLMResponse};
use crate::processing::chunking::chunk_on_delimiter;
use crate::processing::detail::{resolve_chunk_size, DetailParameters, DetailResolution};
use crate::processing::tokenizer::Tokenizer;
use crate::processing::types::CombinedChunk;
use super::{ContentSummarizer, Summary, SummaryConfig, SummaryError, SummaryMetadata};

/// Base system instruction for every chunk request
pub const SYSTEM_PROMPT: &str = "Rewrite this text in summarized form.";

const SUMMARY_SEPARATOR: &str = "\n\n";

/// Chunk text with the boundary delimiter consumed by the split put back
///
/// The delimiter is always appended, even when the text already ends with it,
/// so a chunk ending in an overflow marker `...` is sent as `....`.
fn with_trailing_delimiter(text: &str, delimiter: &str) -> String {
    format!("{}{}", text, delimiter)
}

/// Chunks a document is about to be summarized from
#[derive(Debug, Clone)]
pub struct SummaryPlan {
    /// Detail level resolved to a chunk budget
    pub resolution: DetailResolution,
    /// Chunks built with the resolved budget, in document order
    pub chunks: Vec<CombinedChunk>,
    /// Pieces excluded because they overflowed the budget alone
    pub dropped_count: usize,
}

/// Summarizes long documents chunk by chunk with an LLM
///
/// In independent mode chunk requests run concurrently, bounded by
/// `max_concurrency`, and each response lands in the slot of its chunk. In
/// recursive mode every request carries all earlier partial summaries, so
/// requests run strictly one after another and the first failure ends the run.
pub struct DocumentSummarizer {
    /// LLM client
    client: Arc<dyn LLMClient>,

    /// Token counter used for chunking
    tokenizer: Arc<dyn Tokenizer>,

    /// Summarizer configuration
    config: SummaryConfig,
}

impl DocumentSummarizer {
    /// Create a new document summarizer
    pub fn new(
        client: Arc<dyn LLMClient>,
        tokenizer: Arc<dyn Tokenizer>,
        config: SummaryConfig,
    ) -> Self {
        Self {
            client,
            tokenizer,
            config,
        }
    }

    /// Resolve the chunk budget and build the chunks without calling the model
    pub fn plan(&self, text: &str) -> Result<SummaryPlan, SummaryError> {
        self.config.validate()?;

        let params = DetailParameters {
            detail: self.config.detail,
            minimum_chunk_size: self.config.minimum_chunk_size,
            delimiter: self.config.chunk_delimiter.clone(),
        };
        let resolution = resolve_chunk_size(text, &params, self.tokenizer.as_ref())?;

        let combined = chunk_on_delimiter(
            text,
            resolution.chunk_size,
            &self.config.chunk_delimiter,
            self.tokenizer.as_ref(),
        );

        let lengths: Vec<usize> = combined.chunks.iter().map(|c| c.token_count).collect();
        if self.config.verbose {
            info!("Splitting the text into {} chunks to be summarized", combined.chunks.len());
            info!("Chunk lengths are {:?}", lengths);
        } else {
            debug!("Summarizing {} chunks with lengths {:?}", combined.chunks.len(), lengths);
        }

        Ok(SummaryPlan {
            resolution,
            chunks: combined.chunks,
            dropped_count: combined.dropped_count,
        })
    }

    /// System instruction, extended with the configured additional instructions
    pub fn system_prompt(&self) -> String {
        match &self.config.additional_instructions {
            Some(extra) => format!("{}{}{}", SYSTEM_PROMPT, SUMMARY_SEPARATOR, extra),
            None => SYSTEM_PROMPT.to_string(),
        }
    }

    /// User payload for one chunk
    ///
    /// In recursive mode the chunk is preceded by every earlier partial summary.
    pub fn user_prompt(&self, chunk: &str, previous: &[String]) -> String {
        if !self.config.summarize_recursively || previous.is_empty() {
            return chunk.to_string();
        }
        format!(
            "Previous summaries:\n\n{}\n\nText to summarize next:\n\n{}",
            previous.join(SUMMARY_SEPARATOR),
            chunk
        )
    }

    fn chunk_payload(&self, chunk: &CombinedChunk) -> String {
        with_trailing_delimiter(&chunk.text, &self.config.chunk_delimiter)
    }

    fn request_params(&self) -> LLMParams {
        LLMParams {
            model: self.config.model.clone(),
            system_prompt: Some(self.system_prompt()),
            ..self.config.llm_params.clone()
        }
    }

    async fn call_once(
        &self,
        prompt: &str,
        params: &LLMParams,
        timeout: Option<Duration>,
    ) -> Result<LLMResponse, LLMError> {
        match timeout {
            Some(limit) => tokio::time::timeout(limit, self.client.generate(prompt, params))
                .await
                .map_err(|_| LLMError::Timeout(limit))?,
            None => self.client.generate(prompt, params).await,
        }
    }

    async fn complete_chunk(
        &self,
        index: usize,
        prompt: &str,
        params: &LLMParams,
    ) -> Result<LLMResponse, SummaryError> {
        let timeout = self.config.request_timeout_secs.map(Duration::from_secs);
        let response = retry_with_backoff(&self.config.retry, || {
            self.call_once(prompt, params, timeout)
        })
        .await
        .map_err(|source| SummaryError::ChunkFailed { index, source })?;

        debug!("Chunk {} summarized ({} tokens used)", index, response.tokens_used);
        Ok(response)
    }

    async fn summarize_recursive(
        &self,
        chunks: &[CombinedChunk],
        params: &LLMParams,
    ) -> Result<Vec<LLMResponse>, SummaryError> {
        let mut accumulated: Vec<String> = Vec::with_capacity(chunks.len());
        let mut responses = Vec::with_capacity(chunks.len());

        for (index, chunk) in chunks.iter().enumerate() {
            let prompt = self.user_prompt(&self.chunk_payload(chunk), &accumulated);
            let response = self.complete_chunk(index, &prompt, params).await?;
            accumulated.push(response.text.clone());
            responses.push(response);
        }

        Ok(responses)
    }

    async fn summarize_independent(
        &self,
        chunks: &[CombinedChunk],
        params: &LLMParams,
    ) -> Result<Vec<LLMResponse>, SummaryError> {
        let mut slots: Vec<Option<LLMResponse>> = (0..chunks.len()).map(|_| None).collect();
        let prompts: Vec<(usize, String)> = chunks
            .iter()
            .enumerate()
            .map(|(index, chunk)| (index, self.user_prompt(&self.chunk_payload(chunk), &[])))
            .collect();

        let mut completions = stream::iter(prompts)
            .map(move |(index, prompt)| async move {
                (index, self.complete_chunk(index, &prompt, params).await)
            })
            .buffer_unordered(self.config.max_concurrency);

        // Returning early drops the stream, which cancels requests still in flight
        while let Some((index, result)) = completions.next().await {
            slots[index] = Some(result?);
        }

        Ok(slots.into_iter().flatten().collect())
    }

    /// Summarize `text` at the configured detail level
    ///
    /// In independent mode the reported failure is the first one to complete,
    /// which is not necessarily the failing chunk with the lowest index.
    /// Requests still in flight at that point are cancelled.
    pub async fn summarize(&self, text: &str) -> Result<Summary, SummaryError> {
        let plan = self.plan(text)?;
        let params = self.request_params();

        let responses = if self.config.summarize_recursively {
            self.summarize_recursive(&plan.chunks, &params).await?
        } else {
            self.summarize_independent(&plan.chunks, &params).await?
        };

        let tokens_used: usize = responses.iter().map(|r| r.tokens_used).sum();
        let partial_summaries: Vec<String> = responses.into_iter().map(|r| r.text).collect();

        Ok(Summary {
            text: partial_summaries.join(SUMMARY_SEPARATOR),
            metadata: SummaryMetadata {
                resolution: plan.resolution,
                chunk_count: plan.chunks.len(),
                dropped_count: plan.dropped_count,
                partial_summaries,
                tokens_used,
            },
        })
    }
}

#[async_trait]
impl ContentSummarizer for DocumentSummarizer {
    async fn generate_summary(&self, content: &str) -> Result<Summary, SummaryError> {
        self.summarize(content).await
    }

    fn get_config(&self) -> &SummaryConfig {
        &self.config
    }
}
