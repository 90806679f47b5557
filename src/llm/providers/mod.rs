/// OpenAI API client implementation.
///
/// Provides integration with OpenAI's chat completions endpoint.
pub mod openai;

/// Anthropic API client implementation.
///
/// Provides integration with Anthropic's messages endpoint.
pub mod anthropic;

pub use openai::OpenAIClient;
pub use anthropic::AnthropicClient;

#[cfg(test)]
mod tests;
