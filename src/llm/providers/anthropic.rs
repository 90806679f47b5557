use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::collections::HashMap;
use std::time::Duration;

use crate::llm::{LLMClient, LLMConfig, LLMError, LLMParams, LLMResponse, Provider};

const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Anthropic messages API response format
#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    content: Vec<AnthropicContentBlock>,
    stop_reason: Option<String>,
    model: String,
    #[serde(default)]
    usage: AnthropicUsage,
}

#[derive(Debug, Deserialize)]
struct AnthropicContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
struct AnthropicUsage {
    input_tokens: Option<usize>,
    output_tokens: Option<usize>,
}

/// Anthropic client implementation
pub struct AnthropicClient {
    /// HTTP client
    client: Client,

    /// Client configuration
    config: LLMConfig,
}

impl AnthropicClient {
    /// Create a new Anthropic client
    pub fn new(config: LLMConfig) -> Result<Self, LLMError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| LLMError::ConfigError(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// Build the API request URL
    fn build_url(&self) -> String {
        let endpoint = self
            .config
            .api_endpoint
            .clone()
            .unwrap_or_else(|| Provider::Anthropic.default_api_base());
        format!("{}/v1/messages", endpoint.trim_end_matches('/'))
    }

    /// Build request headers
    fn build_headers(&self) -> Result<reqwest::header::HeaderMap, LLMError> {
        use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};

        let api_key = self.config.api_key.as_ref()
            .ok_or_else(|| LLMError::ConfigError("API key not configured".to_string()))?;

        let mut headers = HeaderMap::new();
        headers.insert(
            "x-api-key",
            HeaderValue::from_str(api_key)
                .map_err(|e| LLMError::ConfigError(e.to_string()))?
        );
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("application/json")
        );
        headers.insert(
            "anthropic-version",
            HeaderValue::from_static(ANTHROPIC_VERSION)
        );

        Ok(headers)
    }

    /// Build request payload
    pub(crate) fn build_request(&self, prompt: &str, params: &LLMParams) -> serde_json::Value {
        let model = if params.model.is_empty() {
            self.config.model.clone()
        } else {
            Provider::parse(&params.model).1
        };

        let mut request = json!({
            "model": model,
            "max_tokens": params.max_tokens,
            "temperature": params.temperature,
            "messages": [
                { "role": "user", "content": prompt }
            ],
        });

        if let Some(system) = &params.system_prompt {
            request["system"] = json!(system);
        }

        // Newer models reject requests that set both sampling knobs
        if params.top_p < 1.0 {
            request["top_p"] = json!(params.top_p);
        }

        for (key, value) in &params.extra_params {
            request[key] = json!(value);
        }

        request
    }
}

#[async_trait]
impl LLMClient for AnthropicClient {
    async fn initialize(&mut self) -> Result<(), LLMError> {
        if self.config.api_key.is_none() {
            return Err(LLMError::ConfigError("API key not configured".to_string()));
        }
        Ok(())
    }

    async fn generate(&self, prompt: &str, params: &LLMParams) -> Result<LLMResponse, LLMError> {
        let response = self.client.post(self.build_url())
            .headers(self.build_headers()?)
            .json(&self.build_request(prompt, params))
            .send()
            .await?;

        let status = response.status();
        let response_text = response.text().await?;

        if !status.is_success() {
            if status.as_u16() == 429 {
                return Err(LLMError::RateLimitExceeded(response_text));
            }
            return Err(LLMError::RequestFailed(format!(
                "Anthropic API error ({}): {}", status, response_text
            )));
        }

        let anthropic_response: AnthropicResponse = serde_json::from_str(&response_text)
            .map_err(|e| LLMError::InvalidResponse(e.to_string()))?;

        let text = anthropic_response
            .content
            .into_iter()
            .filter(|block| block.kind == "text")
            .filter_map(|block| block.text)
            .collect::<Vec<_>>()
            .join("");

        let total_tokens = anthropic_response.usage.input_tokens.unwrap_or(0) +
                          anthropic_response.usage.output_tokens.unwrap_or(0);

        let mut metadata = HashMap::new();
        if let Some(stop_reason) = anthropic_response.stop_reason {
            metadata.insert("stop_reason".to_string(), stop_reason);
        }

        Ok(LLMResponse {
            text,
            tokens_used: total_tokens,
            model: anthropic_response.model,
            metadata,
        })
    }

    fn get_config(&self) -> &LLMConfig {
        &self.config
    }

    fn update_config(&mut self, config: LLMConfig) -> Result<(), LLMError> {
        self.client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| LLMError::ConfigError(e.to_string()))?;
        self.config = config;
        Ok(())
    }
}
