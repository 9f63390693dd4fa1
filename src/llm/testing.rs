//! Canned chat-completions server for agent tests

use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockBuilder, MockServer, ResponseTemplate};

use super::{Agent, LlmProvider};
use crate::auth::Credentials;
use crate::config::{AgentRuntimeConfig, LlmConfig};
use crate::tools::ToolRegistry;

pub const API_KEY: &str = "test-key";

/// Matches chat requests routed through `<endpoint>/openai/v1/`
pub fn chat_completions() -> MockBuilder {
    Mock::given(method("POST")).and(path("/openai/v1/chat/completions"))
}

/// Server-sent event body terminated by `[DONE]`
pub fn sse_response(events: &[Value]) -> ResponseTemplate {
    let mut body = String::new();
    for event in events {
        body.push_str(&format!("data: {}\n\n", event));
    }
    body.push_str("data: [DONE]\n\n");
    ResponseTemplate::new(200).set_body_raw(body, "text/event-stream")
}

fn chunk(delta: Value, finish_reason: Option<&str>) -> Value {
    json!({
        "id": "chatcmpl-1",
        "object": "chat.completion.chunk",
        "created": 1700000000,
        "model": "gpt-4o-mini",
        "choices": [{ "index": 0, "delta": delta, "finish_reason": finish_reason }]
    })
}

pub fn text_chunk(content: &str) -> Value {
    chunk(json!({ "role": "assistant", "content": content }), None)
}

pub fn tool_call_chunk(call_id: &str, name: &str, arguments: Value) -> Value {
    chunk(
        json!({
            "role": "assistant",
            "tool_calls": [{
                "index": 0,
                "id": call_id,
                "type": "function",
                "function": { "name": name, "arguments": arguments.to_string() }
            }]
        }),
        None,
    )
}

pub fn finish_chunk(reason: &str) -> Value {
    chunk(json!({}), Some(reason))
}

pub fn usage_chunk(prompt_tokens: u32, completion_tokens: u32) -> Value {
    json!({
        "id": "chatcmpl-1",
        "object": "chat.completion.chunk",
        "created": 1700000000,
        "model": "gpt-4o-mini",
        "choices": [],
        "usage": {
            "prompt_tokens": prompt_tokens,
            "completion_tokens": completion_tokens,
            "total_tokens": prompt_tokens + completion_tokens
        }
    })
}

/// Agent wired to the mock server with an API key credential
pub async fn agent_for(
    server: &MockServer,
    tools: ToolRegistry,
    max_retries: u32,
    request_timeout_secs: u64,
) -> Agent {
    let llm = LlmConfig {
        endpoint: server.uri(),
        request_timeout_secs,
        ..Default::default()
    };
    let provider = LlmProvider::new(llm, Credentials::ApiKey(API_KEY.to_string()));
    let connection = provider.connection().await.unwrap();
    let config = AgentRuntimeConfig {
        max_retries,
        ..Default::default()
    };
    Agent::new(connection, config, "You are a test agent.", tools)
}
