use crate::support::{PROCESS_MARKER, config_for, fields, mount_flow, request_count};
use mentalcare::app::services::Services;
use mentalcare::config::PipelineMode;
use mentalcare::pipeline::{HELPLINE_MESSAGE, Sentiment};
use serde_json::json;
use tempfile::TempDir;
use wiremock::MockServer;

async fn unified_services(server: &MockServer, workspace: &TempDir) -> Services {
    let mut config = config_for(server, workspace);
    config.pipeline.mode = PipelineMode::Unified;
    Services::build(&config).await.unwrap()
}

#[tokio::test]
async fn unified_mode_uses_one_model_call() {
    let server = MockServer::start().await;
    mount_flow(
        &server,
        PROCESS_MARKER,
        json!({
            "sentiment": "stressed",
            "isDistress": false,
            "aiMessage": "That sounds like a lot. One step at a time."
        }),
        1,
    )
    .await;

    let workspace = TempDir::new().unwrap();
    let services = unified_services(&server, &workspace).await;

    let outcome = services
        .pipeline
        .run(&fields(json!({ "message": "deadlines everywhere", "userId": "u-uni" })))
        .await
        .unwrap();

    assert_eq!(outcome.sentiment, Sentiment::Stressed);
    assert_eq!(outcome.ai_message, "That sounds like a lot. One step at a time.");
    assert!(outcome.referral_message.is_empty());
    assert_eq!(request_count(&server).await, 1);
}

#[tokio::test]
async fn unified_distress_flag_escalates() {
    let server = MockServer::start().await;
    mount_flow(
        &server,
        PROCESS_MARKER,
        json!({
            "sentiment": "sad",
            "isDistress": true,
            "aiMessage": "should be dropped"
        }),
        1,
    )
    .await;

    let workspace = TempDir::new().unwrap();
    let services = unified_services(&server, &workspace).await;

    let outcome = services
        .pipeline
        .run(&fields(json!({ "message": "nothing matters", "userId": "u-uni" })))
        .await
        .unwrap();

    assert_eq!(outcome.sentiment, Sentiment::SevereDistress);
    assert_eq!(outcome.referral_message, HELPLINE_MESSAGE);
    assert!(outcome.ai_message.is_empty());
}
