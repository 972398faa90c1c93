use crate::support::gateway::GatewayTestServer;
use crate::support::{CLASSIFY_MARKER, REPLY_MARKER, config_for, mount_failure, mount_flow};
use reqwest::StatusCode;
use serde_json::{Value, json};
use tempfile::TempDir;
use wiremock::MockServer;

async fn open_server(model: &MockServer, workspace: &TempDir) -> GatewayTestServer {
    GatewayTestServer::start(config_for(model, workspace)).await
}

#[tokio::test]
async fn send_then_read_then_delete() {
    let model = MockServer::start().await;
    mount_flow(
        &model,
        CLASSIFY_MARKER,
        json!({ "sentiment": "anxious", "isDistress": false }),
        1,
    )
    .await;
    mount_flow(
        &model,
        REPLY_MARKER,
        json!({ "reply": "It makes sense to feel nervous. You are not alone in this." }),
        1,
    )
    .await;
    let workspace = TempDir::new().unwrap();
    let server = open_server(&model, &workspace).await;
    let client = reqwest::Client::new();

    let sent = client
        .post(server.url("/api/messages"))
        .json(&json!({ "message": "I'm feeling really anxious about my exam", "userId": "u1" }))
        .send()
        .await
        .unwrap();
    assert_eq!(sent.status(), StatusCode::OK);
    let outcome: Value = sent.json().await.unwrap();
    assert_eq!(outcome["sentiment"], "anxious");
    assert_eq!(outcome["referralMessage"], "");
    assert_eq!(
        outcome["aiMessage"],
        "It makes sense to feel nervous. You are not alone in this."
    );

    let history: Value = client
        .get(server.url("/api/conversations/u1"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let turns = history["turns"].as_array().unwrap();
    assert_eq!(turns.len(), 1);
    assert_eq!(turns[0]["userMessage"], "I'm feeling really anxious about my exam");
    assert_eq!(turns[0]["sentiment"], "anxious");

    let deleted = client
        .post(server.url("/api/history/delete"))
        .json(&json!({ "userId": "u1" }))
        .send()
        .await
        .unwrap();
    assert_eq!(deleted.status(), StatusCode::OK);
    let body: Value = deleted.json().await.unwrap();
    assert_eq!(body["deleted"], 1);
}

#[tokio::test]
async fn invalid_message_is_bad_request() {
    let model = MockServer::start().await;
    let workspace = TempDir::new().unwrap();
    let server = open_server(&model, &workspace).await;

    let response = reqwest::Client::new()
        .post(server.url("/api/messages"))
        .json(&json!({ "message": "  " }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["stage"], "validating");
    let error = body["error"].as_str().unwrap();
    assert!(error.contains("message: must not be empty"));
    assert!(error.contains("userId: is required"));
}

#[tokio::test]
async fn non_object_body_is_bad_request() {
    let model = MockServer::start().await;
    let workspace = TempDir::new().unwrap();
    let server = open_server(&model, &workspace).await;

    let response = reqwest::Client::new()
        .post(server.url("/api/messages"))
        .header("Content-Type", "application/json")
        .body("[1, 2, 3]")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn model_outage_is_bad_gateway_with_generic_message() {
    let model = MockServer::start().await;
    mount_failure(&model, CLASSIFY_MARKER, 503).await;
    let workspace = TempDir::new().unwrap();
    let server = open_server(&model, &workspace).await;

    let response = reqwest::Client::new()
        .post(server.url("/api/messages"))
        .json(&json!({ "message": "rough week", "userId": "u2" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["stage"], "classifying");
    assert_eq!(
        body["error"],
        "An error occurred while processing your message. Please try again."
    );
    assert!(!body.to_string().contains("upstream exploded"));
}

#[tokio::test]
async fn profile_save_and_load() {
    let model = MockServer::start().await;
    let workspace = TempDir::new().unwrap();
    let server = open_server(&model, &workspace).await;
    let client = reqwest::Client::new();

    let missing = client
        .get(server.url("/api/profile/u3"))
        .send()
        .await
        .unwrap();
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);

    let rejected = client
        .put(server.url("/api/profile"))
        .json(&json!({ "userId": "u3", "fullName": "A", "dob": "1990-01-01" }))
        .send()
        .await
        .unwrap();
    assert_eq!(rejected.status(), StatusCode::BAD_REQUEST);

    let saved = client
        .put(server.url("/api/profile"))
        .json(&json!({
            "userId": "u3",
            "fullName": "  Asha Rao ",
            "dob": "1995-04-12",
            "phone": "+91 98765 43210"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(saved.status(), StatusCode::OK);

    let loaded: Value = client
        .get(server.url("/api/profile/u3"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(loaded["fullName"], "Asha Rao");
    assert_eq!(loaded["dateOfBirth"], "1995-04-12");
    assert_eq!(loaded["phone"], "+91 98765 43210");
}

#[tokio::test]
async fn navigate_reports_decision() {
    let model = MockServer::start().await;
    let workspace = TempDir::new().unwrap();
    let server = open_server(&model, &workspace).await;
    let client = reqwest::Client::new();

    let signed_out: Value = client
        .get(server.url("/api/navigate?path=/chat"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(signed_out["class"], "protected");
    assert_eq!(signed_out["decision"], "redirect");
    assert_eq!(signed_out["target"], "/login");

    let signed_in: Value = client
        .get(server.url("/api/navigate?path=/chat&authenticated=true"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(signed_in["decision"], "allow");
    assert_eq!(signed_in["target"], Value::Null);
}

#[tokio::test]
async fn navigate_without_path_is_json_bad_request() {
    let model = MockServer::start().await;
    let workspace = TempDir::new().unwrap();
    let server = open_server(&model, &workspace).await;
    let client = reqwest::Client::new();

    for query in ["/api/navigate", "/api/navigate?path=/chat&authenticated=maybe"] {
        let response = client.get(server.url(query)).send().await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: Value = response.json().await.unwrap();
        assert!(
            body.get("error")
                .and_then(Value::as_str)
                .is_some_and(|msg| msg.starts_with("Invalid input"))
        );
    }
}
