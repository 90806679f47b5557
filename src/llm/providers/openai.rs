use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::collections::HashMap;
use std::time::Duration;

use crate::llm::{LLMClient, LLMConfig, LLMError, LLMParams, LLMResponse, Provider};

/// OpenAI chat completion response format
#[derive(Debug, Deserialize)]
struct OpenAIResponse {
    choices: Vec<OpenAIChoice>,
    #[serde(default)]
    usage: Option<OpenAIUsage>,
    model: String,
}

#[derive(Debug, Deserialize)]
struct OpenAIChoice {
    message: OpenAIMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAIMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAIUsage {
    total_tokens: usize,
}

/// OpenAI client implementation
pub struct OpenAIClient {
    /// HTTP client
    client: Client,

    /// Client configuration
    config: LLMConfig,
}

impl OpenAIClient {
    /// Create a new OpenAI client
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
            .unwrap_or_else(|| Provider::OpenAI.default_api_base());
        format!("{}/v1/chat/completions", endpoint.trim_end_matches('/'))
    }

    /// Build request headers
    fn build_headers(&self) -> Result<reqwest::header::HeaderMap, LLMError> {
        use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};

        let api_key = self.config.api_key.as_ref()
            .ok_or_else(|| LLMError::ConfigError("API key not configured".to_string()))?;

        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", api_key))
                .map_err(|e| LLMError::ConfigError(e.to_string()))?
        );
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("application/json")
        );

        if let Some(org_id) = &self.config.org_id {
            headers.insert(
                "OpenAI-Organization",
                HeaderValue::from_str(org_id)
                    .map_err(|e| LLMError::ConfigError(e.to_string()))?
            );
        }

        Ok(headers)
    }

    /// Build messages for chat completion
    fn build_messages(&self, prompt: &str, params: &LLMParams) -> Vec<serde_json::Value> {
        let mut messages = Vec::new();

        if let Some(system_prompt) = &params.system_prompt {
            messages.push(json!({
                "role": "system",
                "content": system_prompt
            }));
        }

        messages.push(json!({
            "role": "user",
            "content": prompt
        }));

        messages
    }

    /// Build request payload
    pub(crate) fn build_request(&self, prompt: &str, params: &LLMParams) -> serde_json::Value {
        let model = if params.model.is_empty() {
            self.config.model.clone()
        } else {
            Provider::parse(&params.model).1
        };

        let mut request_body = json!({
            "model": model,
            "messages": self.build_messages(prompt, params),
            "temperature": params.temperature,
            "top_p": params.top_p,
            "max_tokens": params.max_tokens,
        });

        for (key, value) in &params.extra_params {
            request_body[key] = serde_json::Value::String(value.clone());
        }

        request_body
    }
}

#[async_trait]
impl LLMClient for OpenAIClient {
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
        if !status.is_success() {
            let error = response.text().await.unwrap_or_default();
            if status.as_u16() == 429 {
                return Err(LLMError::RateLimitExceeded(error));
            }
            return Err(LLMError::RequestFailed(format!(
                "OpenAI API error ({}): {}", status, error
            )));
        }

        let openai_response: OpenAIResponse = response.json().await
            .map_err(|e| LLMError::InvalidResponse(e.to_string()))?;

        let choice = openai_response.choices.into_iter().next()
            .ok_or_else(|| LLMError::InvalidResponse("response contained no choices".to_string()))?;

        let mut metadata = HashMap::new();
        if let Some(finish_reason) = choice.finish_reason {
            metadata.insert("finish_reason".to_string(), finish_reason);
        }

        Ok(LLMResponse {
            text: choice.message.content.unwrap_or_default(),
            tokens_used: openai_response.usage.map(|u| u.total_tokens).unwrap_or(0),
            model: openai_response.model,
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
