#![allow(dead_code)]

use mentalcare::config::{Config, LlmConfig, StoreConfig};
use mentalcare::pipeline::RawFields;
use serde_json::{Value, json};
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const API_KEY: &str = "AIzaIntegrationKey";
pub const MODEL: &str = "gemini-2.5-flash";
pub const ENDPOINT: &str = "/models/gemini-2.5-flash:generateContent";

/// Phrases that only appear in one prompt each, used to route mocked answers.
pub const CLASSIFY_MARKER: &str = "Analyze the sentiment of the following user message";
pub const REPLY_MARKER: &str = "Generate a short, supportive reply";
pub const PROCESS_MARKER: &str = "You must perform three tasks";
pub const REFER_MARKER: &str = "needs immediate help";

/// A Gemini `generateContent` body whose only text part is `payload` as JSON.
pub fn gemini_answer(payload: &Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "candidates": [{
            "content": { "role": "model", "parts": [{ "text": payload.to_string() }] },
            "finishReason": "STOP"
        }],
        "usageMetadata": { "promptTokenCount": 40, "candidatesTokenCount": 12 },
        "modelVersion": MODEL
    }))
}

/// Answer every prompt containing `marker` with `payload`, expecting exactly `times` calls.
pub async fn mount_flow(server: &MockServer, marker: &str, payload: Value, times: u64) {
    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .and(header("x-goog-api-key", API_KEY))
        .and(body_string_contains(marker))
        .respond_with(gemini_answer(&payload))
        .expect(times)
        .mount(server)
        .await;
}

/// Like [`mount_flow`], but the answer arrives after `delay`.
pub async fn mount_slow_flow(server: &MockServer, marker: &str, payload: Value, delay: Duration) {
    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .and(body_string_contains(marker))
        .respond_with(gemini_answer(&payload).set_delay(delay))
        .mount(server)
        .await;
}

/// Fail every prompt containing `marker` with `status`.
pub async fn mount_failure(server: &MockServer, marker: &str, status: u16) {
    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .and(body_string_contains(marker))
        .respond_with(ResponseTemplate::new(status).set_body_string("upstream exploded"))
        .mount(server)
        .await;
}

/// Config pointed at the mock server with an in-memory store.
pub fn config_for(server: &MockServer, workspace: &TempDir) -> Config {
    Config {
        workspace_dir: workspace.path().join("workspace"),
        config_path: workspace.path().join("config.toml"),
        api_key: Some(API_KEY.to_string()),
        llm: LlmConfig {
            base_url: server.uri(),
            timeout_secs: 5,
            ..LlmConfig::default()
        },
        store: StoreConfig::in_memory(),
        ..Config::default()
    }
}

pub fn fields(value: Value) -> RawFields {
    match value {
        Value::Object(map) => map,
        other => panic!("form fields must be a JSON object, got {other}"),
    }
}

pub async fn request_count(server: &MockServer) -> usize {
    server
        .received_requests()
        .await
        .map_or(0, |requests| requests.len())
}

pub mod gateway;
