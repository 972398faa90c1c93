use crate::support::gateway::GatewayTestServer;
use crate::support::config_for;
use reqwest::StatusCode;
use serde_json::Value;
use tempfile::TempDir;
use wiremock::MockServer;

async fn guarded_server(model: &MockServer, workspace: &TempDir) -> GatewayTestServer {
    let mut config = config_for(model, workspace);
    config.gateway.bearer_tokens = vec!["token-abc".to_string()];
    GatewayTestServer::start(config).await
}

#[tokio::test]
async fn api_routes_require_bearer_token() {
    let model = MockServer::start().await;
    let workspace = TempDir::new().unwrap();
    let server = guarded_server(&model, &workspace).await;
    let client = reqwest::Client::new();

    let no_bearer = client
        .get(server.url("/api/conversations/u1"))
        .send()
        .await
        .expect("request without bearer should complete");
    assert_eq!(no_bearer.status(), StatusCode::UNAUTHORIZED);
    let body: Value = no_bearer
        .json()
        .await
        .expect("unauthorized response should be json");
    assert!(
        body.get("error")
            .and_then(Value::as_str)
            .is_some_and(|msg| msg.contains("bearer token"))
    );

    let wrong_bearer = client
        .get(server.url("/api/conversations/u1"))
        .header("Authorization", "Bearer token-xyz")
        .send()
        .await
        .expect("request with wrong bearer should complete");
    assert_eq!(wrong_bearer.status(), StatusCode::UNAUTHORIZED);

    let authorized = client
        .get(server.url("/api/conversations/u1"))
        .header("Authorization", "Bearer token-abc")
        .send()
        .await
        .expect("authorized request should complete");
    assert_eq!(authorized.status(), StatusCode::OK);
    let body: Value = authorized.json().await.unwrap();
    assert_eq!(body["userId"], "u1");
    assert_eq!(body["turns"], Value::Array(vec![]));
}

#[tokio::test]
async fn health_is_public() {
    let model = MockServer::start().await;
    let workspace = TempDir::new().unwrap();
    let server = guarded_server(&model, &workspace).await;

    let response = reqwest::get(server.url("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert!(body.get("components").is_some());
    assert!(body["components"].get("store").is_some());
}
