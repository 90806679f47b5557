use crate::llm::providers::openai::OpenAIClient;
use crate::types::llm::{LLMClient, LLMConfig, LLMError, LLMParams};
use serde_json::json;
use tokio::test;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> OpenAIClient {
    let config = LLMConfig {
        api_endpoint: Some(server.uri()),
        api_key: Some("test-key".to_string()),
        ..Default::default()
    };
    OpenAIClient::new(config).unwrap()
}

#[test]
async fn test_build_request() {
    let client = OpenAIClient::new(LLMConfig::default()).unwrap();

    let mut params = LLMParams {
        model: "openai/gpt-4o".to_string(),
        system_prompt: Some("Rewrite this text in summarized form.".to_string()),
        top_p: 0.5,
        ..Default::default()
    };
    params.extra_params.insert("user".to_string(), "tester".to_string());

    let request = client.build_request("Some text.", &params);

    assert_eq!(request["model"], "gpt-4o");
    assert_eq!(request["messages"][0]["role"], "system");
    assert_eq!(request["messages"][0]["content"], "Rewrite this text in summarized form.");
    assert_eq!(request["messages"][1]["role"], "user");
    assert_eq!(request["messages"][1]["content"], "Some text.");
    assert_eq!(request["temperature"], 0.0);
    assert_eq!(request["top_p"], 0.5);
    assert_eq!(request["max_tokens"], 1024);
    assert_eq!(request["user"], "tester");
}

#[test]
async fn test_build_request_falls_back_to_config_model() {
    let config = LLMConfig {
        model: "gpt-4o-mini".to_string(),
        ..Default::default()
    };
    let client = OpenAIClient::new(config).unwrap();

    let request = client.build_request("text", &LLMParams::default());

    assert_eq!(request["model"], "gpt-4o-mini");
    assert_eq!(request["messages"].as_array().unwrap().len(), 1);
}

#[test]
async fn test_generate_parses_completion() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer test-key"))
        .and(body_partial_json(json!({ "model": "gpt-4-turbo" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "chatcmpl-1",
            "model": "gpt-4-turbo-2024-04-09",
            "choices": [{
                "index": 0,
                "message": { "role": "assistant", "content": "A short summary." },
                "finish_reason": "stop"
            }],
            "usage": { "prompt_tokens": 30, "completion_tokens": 12, "total_tokens": 42 }
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let params = LLMParams {
        model: "gpt-4-turbo".to_string(),
        ..Default::default()
    };
    let response = client.generate("A long text.", &params).await.unwrap();

    assert_eq!(response.text, "A short summary.");
    assert_eq!(response.tokens_used, 42);
    assert_eq!(response.model, "gpt-4-turbo-2024-04-09");
    assert_eq!(response.metadata.get("finish_reason").map(String::as_str), Some("stop"));
}

#[test]
async fn test_rate_limit_maps_to_retryable_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
        .mount(&mock_server)
        .await;

    let error = client_for(&mock_server)
        .generate("text", &LLMParams::default())
        .await
        .unwrap_err();

    assert!(matches!(error, LLMError::RateLimitExceeded(ref body) if body == "slow down"));
    assert!(error.is_retryable());
}

#[test]
async fn test_server_error_maps_to_request_failed() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&mock_server)
        .await;

    let error = client_for(&mock_server)
        .generate("text", &LLMParams::default())
        .await
        .unwrap_err();

    match error {
        LLMError::RequestFailed(msg) => {
            assert!(msg.contains("500"));
            assert!(msg.contains("boom"));
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
async fn test_empty_choices_is_invalid_response() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "model": "gpt-4-turbo",
            "choices": []
        })))
        .mount(&mock_server)
        .await;

    let error = client_for(&mock_server)
        .generate("text", &LLMParams::default())
        .await
        .unwrap_err();

    assert!(matches!(error, LLMError::InvalidResponse(_)));
    assert!(!error.is_retryable());
}

#[test]
async fn test_missing_api_key() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let config = LLMConfig {
        api_endpoint: Some(mock_server.uri()),
        ..Default::default()
    };
    let mut client = OpenAIClient::new(config).unwrap();

    assert!(matches!(client.initialize().await, Err(LLMError::ConfigError(_))));
    let error = client.generate("text", &LLMParams::default()).await.unwrap_err();
    assert!(matches!(error, LLMError::ConfigError(_)));
}

#[test]
async fn test_organization_header_is_sent() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("OpenAI-Organization", "org-test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "model": "gpt-4-turbo",
            "choices": [{ "message": { "content": "ok" } }]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = LLMConfig {
        api_endpoint: Some(mock_server.uri()),
        api_key: Some("test-key".to_string()),
        org_id: Some("org-test".to_string()),
        ..Default::default()
    };
    let client = OpenAIClient::new(config).unwrap();

    let response = client.generate("text", &LLMParams::default()).await.unwrap();
    assert_eq!(response.text, "ok");
    assert_eq!(response.tokens_used, 0);
}

#[test]
async fn test_update_config_switches_endpoint() {
    let old_server = MockServer::start().await;
    let new_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&old_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer new-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "model": "gpt-4o",
            "choices": [{ "message": { "content": "from new endpoint" } }]
        })))
        .expect(1)
        .mount(&new_server)
        .await;

    let mut client = client_for(&old_server);
    let updated = LLMConfig {
        model: "gpt-4o".to_string(),
        api_endpoint: Some(new_server.uri()),
        api_key: Some("new-key".to_string()),
        timeout_secs: 10,
        ..Default::default()
    };
    client.update_config(updated).unwrap();

    assert_eq!(client.get_config().model, "gpt-4o");
    assert_eq!(client.get_config().timeout_secs, 10);

    let response = client.generate("text", &LLMParams::default()).await.unwrap();
    assert_eq!(response.text, "from new endpoint");
}
