// holonet-core/src/api.rs

//! Thin REST clients for the completion and embedding collaborators.

use anyhow::{anyhow, Context, Result};
use reqwest::Client;
use serde_json::{json, to_value, Value};
use tracing::debug;
use uuid::Uuid;

use crate::config::RuntimeConfig;
use crate::models::chat::{ApiResponse, ChatMessage};
use crate::models::tools::ToolDefinition;

/// Sampling parameters fixed for every completion request.
pub const MAX_COMPLETION_TOKENS: u32 = 2000;
pub const TEMPERATURE: f64 = 0.7;

pub async fn get_chat_completion(
    client: &Client,
    config: &RuntimeConfig,
    messages: Vec<ChatMessage>,
    tool_definitions: &[ToolDefinition],
) -> Result<ApiResponse> {
    let url = config.chat_completions_url()?;

    let request_body = build_chat_request(&config.model_name, messages, tool_definitions)?;

    debug!(
        "Request URL: {}\nRequest JSON: {}",
        url,
        serde_json::to_string_pretty(&request_body)?
    );

    let response = client
        .post(url)
        .header("Content-Type", "application/json")
        .header("Authorization", format!("Bearer {}", config.api_key))
        .json(&request_body)
        .send()
        .await
        .context("Failed to send chat completion request")?;

    let status = response.status();
    if !status.is_success() {
        let error_text = response
            .text()
            .await
            .context("Failed to read API error response body")?;
        debug!("API request failed. Status: {}, Body: {}", status, error_text);
        return Err(anyhow!("API error: {} - {}", status, error_text));
    }

    let response_value: Value = response
        .json()
        .await
        .context("Failed to read API response body as JSON")?;

    let mut response_json_obj = if let Value::Object(map) = response_value.clone() {
        map
    } else {
        return Err(anyhow!(
            "API response was not a JSON object: {:?}",
            response_value
        ));
    };

    // Some gateways omit the id; fill one in so deserialization succeeds.
    if !response_json_obj.contains_key("id") {
        let new_id = format!("chatcmpl-{}", Uuid::new_v4());
        debug!("Added missing 'id' field to API response with value: {}", new_id);
        response_json_obj.insert("id".to_string(), json!(new_id));
    }

    let api_response: ApiResponse =
        serde_json::from_value(Value::Object(response_json_obj)).map_err(|e| {
            debug!("ERROR: failed to deserialize API response {:#?}", response_value);
            anyhow!("Failed to deserialize API response").context(e)
        })?;

    if let Some(choice) = api_response.choices.first() {
        if let Some(tool_calls) = &choice.message.tool_calls {
            debug!("Tool calls: {:#?}", tool_calls);
        } else {
            debug!("No tool calls");
        }
    } else {
        debug!("Response has empty 'choices' array");
    }

    Ok(api_response)
}

fn build_chat_request(
    model_name: &str,
    messages: Vec<ChatMessage>,
    tool_definitions: &[ToolDefinition],
) -> Result<Value> {
    let mut request_map = serde_json::Map::new();
    request_map.insert("model".to_string(), json!(model_name));
    request_map.insert("messages".to_string(), to_value(messages)?);
    request_map.insert("max_tokens".to_string(), json!(MAX_COMPLETION_TOKENS));
    request_map.insert("temperature".to_string(), json!(TEMPERATURE));

    let tools_json: Vec<Value> = tool_definitions
        .iter()
        .map(|tool_def| {
            json!({
                "type": "function",
                "function": tool_def
            })
        })
        .collect();

    if !tools_json.is_empty() {
        request_map.insert("tools".to_string(), Value::Array(tools_json));
        request_map.insert("tool_choice".to_string(), json!("auto"));
    }

    Ok(Value::Object(request_map))
}

/// Embeds a single input string and returns its vector.
pub async fn get_embedding(
    client: &Client,
    config: &RuntimeConfig,
    input: &str,
) -> Result<Vec<f32>> {
    let url = config.embeddings_url()?;

    let request_body = json!({
        "model": config.embedding_model,
        "input": [input],
    });

    let response = client
        .post(url)
        .header("Content-Type", "application/json")
        .header("Authorization", format!("Bearer {}", config.api_key))
        .json(&request_body)
        .send()
        .await
        .context("Failed to send embeddings request")?;

    let status = response.status();
    if !status.is_success() {
        let error_text = response
            .text()
            .await
            .context("Failed to read embeddings error response body")?;
        return Err(anyhow!("Embeddings API error: {} - {}", status, error_text));
    }

    #[derive(serde::Deserialize)]
    struct EmbeddingsResponse {
        data: Vec<EmbeddingData>,
    }
    #[derive(serde::Deserialize)]
    struct EmbeddingData {
        embedding: Vec<f32>,
    }

    let body: EmbeddingsResponse = response
        .json()
        .await
        .context("Failed to deserialize embeddings response")?;

    let vector = body
        .data
        .into_iter()
        .next()
        .map(|d| d.embedding)
        .ok_or_else(|| anyhow!("Embeddings response contained no data"))?;

    debug!(dimensions = vector.len(), "Received embedding vector.");
    Ok(vector)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{RuntimeConfig, DEFAULT_EMBEDDING_MODEL, DEFAULT_SWAPI_BASE_URL};
    use crate::models::tools::ToolDefinition;
    use serde_json::json;
    use url::Url;

    use httpmock::prelude::*;
    use tokio;

    // --- Test helpers ---

    fn create_test_config(base_url: &str) -> RuntimeConfig {
        RuntimeConfig {
            openai_endpoint: Url::parse(&format!("{}/", base_url)).unwrap(),
            api_key: "test-api-key".to_string(),
            model_name: "test-model".to_string(),
            embedding_model: DEFAULT_EMBEDDING_MODEL.to_string(),
            swapi_base_url: Url::parse(DEFAULT_SWAPI_BASE_URL).unwrap(),
            search: None,
            max_tool_hops: 1,
        }
    }

    fn create_mock_tool_definitions() -> Vec<ToolDefinition> {
        vec![ToolDefinition::single_string_param(
            "mock_tool",
            "A mock tool",
            "arg1",
            "Arg 1",
        )]
    }

    // --- Tests for build_chat_request ---

    #[test]
    fn test_build_chat_request_basic() {
        let messages = vec![ChatMessage::user("Hello")];
        let tool_definitions = create_mock_tool_definitions();
        let value = build_chat_request("gpt-basic", messages.clone(), &tool_definitions).unwrap();
        assert_eq!(value["messages"], json!(messages));
        assert_eq!(value["max_tokens"], json!(MAX_COMPLETION_TOKENS));
        assert_eq!(value["temperature"], json!(TEMPERATURE));
        assert_eq!(value["tool_choice"], json!("auto"));
        assert_eq!(value["tools"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_build_chat_request_no_tools_omits_catalog() {
        let messages = vec![ChatMessage::user("Hi")];
        let value = build_chat_request("gpt-no-tools", messages.clone(), &[]).unwrap();
        assert_eq!(value["messages"], json!(messages));
        assert!(value.get("tools").is_none());
        assert!(value.get("tool_choice").is_none());
    }

    // --- Tests for get_chat_completion ---

    #[tokio::test]
    async fn test_get_chat_completion_success() {
        let server = MockServer::start_async().await;
        let config = create_test_config(&server.base_url());
        let messages = vec![ChatMessage::user("Ping")];
        let tool_definitions = create_mock_tool_definitions();

        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/chat/completions")
                    .header("Authorization", "Bearer test-api-key")
                    .json_body(
                        build_chat_request("test-model", messages.clone(), &tool_definitions)
                            .unwrap(),
                    );
                then.status(200).json_body(json!({
                    "id": "chatcmpl-123",
                    "choices": [{"index": 0, "message": {"role": "assistant", "content": "Pong"}, "finish_reason": "stop"}],
                    "usage": {"prompt_tokens": 5, "completion_tokens": 1, "total_tokens": 6}
                }));
            })
            .await;

        let client = Client::new();
        let result = get_chat_completion(&client, &config, messages, &tool_definitions).await;
        mock.assert_async().await;
        assert!(result.is_ok(), "Expected Ok, got Err: {:?}", result.err());
        let response = result.unwrap();
        assert_eq!(response.id, "chatcmpl-123");
        assert_eq!(response.usage.unwrap().total_tokens, 6);
    }

    #[tokio::test]
    async fn test_get_chat_completion_fills_missing_id() {
        let server = MockServer::start_async().await;
        let config = create_test_config(&server.base_url());
        let messages = vec![ChatMessage::user("Ping")];

        server
            .mock_async(|when, then| {
                when.method(POST).path("/chat/completions");
                then.status(200).json_body(json!({
                    "choices": [{"index": 0, "message": {"role": "assistant", "content": "Pong"}, "finish_reason": "stop"}]
                }));
            })
            .await;

        let client = Client::new();
        let response = get_chat_completion(&client, &config, messages, &[])
            .await
            .unwrap();
        assert!(response.id.starts_with("chatcmpl-"));
    }

    #[tokio::test]
    async fn test_get_chat_completion_surfaces_api_error() {
        let server = MockServer::start_async().await;
        let config = create_test_config(&server.base_url());
        let messages = vec![ChatMessage::user("Boom")];

        server
            .mock_async(|when, then| {
                when.method(POST).path("/chat/completions");
                then.status(401).body("invalid key");
            })
            .await;

        let client = Client::new();
        let result = get_chat_completion(&client, &config, messages, &[]).await;
        assert!(result.is_err());
        let message = result.err().unwrap().to_string();
        assert!(message.contains("401"), "Unexpected error: {}", message);
        assert!(message.contains("invalid key"), "Unexpected error: {}", message);
    }

    // --- Tests for get_embedding ---

    #[tokio::test]
    async fn test_get_embedding_returns_first_vector() {
        let server = MockServer::start_async().await;
        let config = create_test_config(&server.base_url());

        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/embeddings").json_body(json!({
                    "model": DEFAULT_EMBEDDING_MODEL,
                    "input": ["speeder bike"],
                }));
                then.status(200).json_body(json!({
                    "data": [{"embedding": [0.25, -0.5, 0.75]}]
                }));
            })
            .await;

        let client = Client::new();
        let vector = get_embedding(&client, &config, "speeder bike").await.unwrap();
        mock.assert_async().await;
        assert_eq!(vector, vec![0.25, -0.5, 0.75]);
    }

    #[tokio::test]
    async fn test_get_embedding_empty_data_is_error() {
        let server = MockServer::start_async().await;
        let config = create_test_config(&server.base_url());

        server
            .mock_async(|when, then| {
                when.method(POST).path("/embeddings");
                then.status(200).json_body(json!({ "data": [] }));
            })
            .await;

        let client = Client::new();
        let result = get_embedding(&client, &config, "anything").await;
        assert!(result.is_err());
    }
}
