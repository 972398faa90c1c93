use crate::support::gateway::GatewayTestServer;
use crate::support::{CLASSIFY_MARKER, config_for, mount_slow_flow};
use serde_json::{Value, json};
use std::time::Duration;
use tempfile::TempDir;
use wiremock::MockServer;

async fn turn_count(client: &reqwest::Client, server: &GatewayTestServer, user: &str) -> usize {
    let body: Value = client
        .get(server.url(&format!("/api/conversations/{user}")))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    body["turns"].as_array().map_or(0, Vec::len)
}

#[tokio::test]
async fn message_run_survives_client_disconnect() {
    let model = MockServer::start().await;
    mount_slow_flow(
        &model,
        CLASSIFY_MARKER,
        json!({ "sentiment": "happy", "isDistress": false }),
        Duration::from_millis(600),
    )
    .await;
    let workspace = TempDir::new().unwrap();
    let server = GatewayTestServer::start(config_for(&model, &workspace)).await;

    let impatient = reqwest::Client::builder()
        .timeout(Duration::from_millis(150))
        .build()
        .unwrap();
    let sent = impatient
        .post(server.url("/api/messages"))
        .json(&json!({ "message": "Got the job!", "userId": "u-gone" }))
        .send()
        .await;
    assert!(sent.is_err(), "client should give up before the model answers");
    drop(impatient);

    let client = reqwest::Client::new();
    let mut persisted = 0;
    for _ in 0..60 {
        persisted = turn_count(&client, &server, "u-gone").await;
        if persisted > 0 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    assert_eq!(persisted, 1);
}
