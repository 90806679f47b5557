// Re-export common types from types module
pub use crate::types::llm::{
    LLMClient,
    LLMConfig,
    LLMParams,
    LLMResponse,
    LLMError,
};

/// Provider selection and environment-driven client configuration.
pub mod config;

/// Module containing implementations for different LLM providers.
///
/// Supported providers:
/// - OpenAI: For GPT models
/// - Anthropic: For Claude models
pub mod providers;

/// Explicit retry policy with exponential backoff.
pub mod retry;

pub use config::Provider;
pub use providers::*;
pub use retry::{retry_with_backoff, RetryConfig};

/// Create a client for a `provider/model` identifier
///
/// Bare model names are routed to OpenAI. The model part of the identifier
/// becomes the client's default model.
pub fn create_client(model: &str, mut config: LLMConfig) -> Result<Box<dyn LLMClient>, LLMError> {
    let (provider, model_name) = Provider::parse(model);
    config.model = model_name;

    match provider {
        Provider::OpenAI => Ok(Box::new(OpenAIClient::new(config)?)),
        Provider::Anthropic => Ok(Box::new(AnthropicClient::new(config)?)),
        Provider::Custom(name) => Err(LLMError::ConfigError(format!(
            "Unsupported provider: {}",
            name
        ))),
    }
}
