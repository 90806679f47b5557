use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;
use serde::{Deserialize, Serialize};
use async_trait::async_trait;

/// Errors that can occur during LLM operations
#[derive(Error, Debug)]
pub enum LLMError {
    /// API request failed
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Invalid response format
    #[error("Invalid response format: {0}")]
    InvalidResponse(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// The request did not complete in time
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),
}

impl LLMError {
    /// Whether repeating the same request may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            LLMError::RequestFailed(_) | LLMError::RateLimitExceeded(_) | LLMError::Timeout(_)
        )
    }
}

impl From<reqwest::Error> for LLMError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            LLMError::RequestFailed(format!("Request timed out: {}", err))
        } else if err.is_connect() {
            LLMError::RequestFailed(format!("Connection failed: {}", err))
        } else if err.is_decode() {
            LLMError::InvalidResponse(err.to_string())
        } else {
            LLMError::RequestFailed(err.to_string())
        }
    }
}

/// Parameters for LLM requests
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LLMParams {
    /// Model identifier, optionally prefixed with a provider (e.g. "anthropic/claude-3-5-haiku-latest")
    pub model: String,

    /// Maximum number of tokens to generate
    pub max_tokens: usize,

    /// Temperature for generation (0.0 to 1.0)
    pub temperature: f32,

    /// Top-p sampling parameter
    pub top_p: f32,

    /// System prompt (if supported by model)
    pub system_prompt: Option<String>,

    /// Additional model-specific parameters
    pub extra_params: HashMap<String, String>,
}

impl Default for LLMParams {
    fn default() -> Self {
        Self {
            model: String::new(),
            max_tokens: 1024,
            temperature: 0.0,
            top_p: 1.0,
            system_prompt: None,
            extra_params: HashMap::new(),
        }
    }
}

/// Configuration for LLM client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LLMConfig {
    /// Model used when a request does not name one
    pub model: String,

    /// API endpoint (if applicable)
    pub api_endpoint: Option<String>,

    /// API key (if required)
    pub api_key: Option<String>,

    /// Organization ID (if applicable)
    pub org_id: Option<String>,

    /// Timeout in seconds
    pub timeout_secs: u64,

    /// Additional configuration parameters
    pub extra_config: HashMap<String, String>,
}

impl Default for LLMConfig {
    fn default() -> Self {
        Self {
            model: String::from("gpt-4-turbo"),
            api_endpoint: None,
            api_key: None,
            org_id: None,
            timeout_secs: 120,
            extra_config: HashMap::new(),
        }
    }
}

/// Response from LLM generation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LLMResponse {
    /// Generated text
    pub text: String,

    /// Number of tokens used
    pub tokens_used: usize,

    /// Model used for generation
    pub model: String,

    /// Additional metadata
    pub metadata: HashMap<String, String>,
}

/// Trait for LLM clients
///
/// Implementations perform exactly one request per `generate` call. Retries,
/// timeouts and ordering are the caller's concern.
#[async_trait]
pub trait LLMClient: Send + Sync {
    /// Initialize the client
    async fn initialize(&mut self) -> Result<(), LLMError>;

    /// Generate text from a prompt, using `params.system_prompt` as the system instruction
    async fn generate(&self, prompt: &str, params: &LLMParams) -> Result<LLMResponse, LLMError>;

    /// Get the current configuration
    fn get_config(&self) -> &LLMConfig;

    /// Update the configuration
    fn update_config(&mut self, config: LLMConfig) -> Result<(), LLMError>;
}
