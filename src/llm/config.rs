use serde::{Deserialize, Serialize};

use crate::types::llm::LLMConfig;

/// Provider type for configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum Provider {
    /// OpenAI chat completions API
    OpenAI,
    /// Anthropic messages API
    Anthropic,
    /// Any other provider name found in a model identifier
    Custom(String),
}

impl Provider {
    /// Get default API base URL for provider
    pub fn default_api_base(&self) -> String {
        match self {
            Provider::OpenAI => "https://api.openai.com".to_string(),
            Provider::Anthropic => "https://api.anthropic.com".to_string(),
            Provider::Custom(_) => String::new(),
        }
    }

    /// Parse provider from string (e.g., "openai/gpt-4" -> (Provider::OpenAI, "gpt-4"))
    pub fn parse(provider_string: &str) -> (Self, String) {
        if let Some((provider, model)) = provider_string.split_once('/') {
            let provider = match provider.to_lowercase().as_str() {
                "openai" => Self::OpenAI,
                "anthropic" => Self::Anthropic,
                custom => Self::Custom(custom.to_string()),
            };
            (provider, model.to_string())
        } else {
            // Default to treating as direct model name with OpenAI
            (Self::OpenAI, provider_string.to_string())
        }
    }
}

impl LLMConfig {
    /// Load client configuration for `provider` from environment variables
    ///
    /// `LLM_API_KEY` wins over the provider-specific key variable.
    pub fn from_env(provider: &Provider) -> Self {
        let mut config = Self::default();

        config.api_key = std::env::var("LLM_API_KEY")
            .or_else(|_| match provider {
                Provider::OpenAI => std::env::var("OPENAI_API_KEY"),
                Provider::Anthropic => std::env::var("ANTHROPIC_API_KEY"),
                Provider::Custom(_) => Err(std::env::VarError::NotPresent),
            })
            .ok();

        config.api_endpoint = std::env::var("LLM_API_BASE")
            .ok()
            .or_else(|| Some(provider.default_api_base()).filter(|base| !base.is_empty()));

        if let Ok(org_id) = std::env::var("LLM_ORG_ID") {
            config.org_id = Some(org_id);
        }
        if let Ok(model) = std::env::var("LLM_MODEL") {
            config.model = model;
        }
        if let Ok(timeout) = std::env::var("LLM_TIMEOUT_SECS") {
            if let Ok(secs) = timeout.parse() {
                config.timeout_secs = secs;
            }
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_provider_prefix() {
        assert_eq!(
            Provider::parse("anthropic/claude-3-5-haiku-latest"),
            (Provider::Anthropic, "claude-3-5-haiku-latest".to_string())
        );
        assert_eq!(
            Provider::parse("OpenAI/gpt-4o"),
            (Provider::OpenAI, "gpt-4o".to_string())
        );
        assert_eq!(
            Provider::parse("mistral/large"),
            (Provider::Custom("mistral".to_string()), "large".to_string())
        );
    }

    #[test]
    fn test_parse_bare_model_defaults_to_openai() {
        assert_eq!(
            Provider::parse("gpt-4-turbo"),
            (Provider::OpenAI, "gpt-4-turbo".to_string())
        );
    }
}
