use crate::support::{
    CLASSIFY_MARKER, REFER_MARKER, REPLY_MARKER, config_for, fields, mount_failure, mount_flow,
    request_count,
};
use mentalcare::app::services::Services;
use mentalcare::config::ReferralPolicy;
use mentalcare::pipeline::{HELPLINE_MESSAGE, PipelineStage, SEND_FAILURE_MESSAGE, Sentiment, UserId};
use serde_json::json;
use tempfile::TempDir;
use wiremock::MockServer;

#[tokio::test]
async fn severe_distress_gets_helpline_and_no_reply() {
    let server = MockServer::start().await;
    mount_flow(
        &server,
        CLASSIFY_MARKER,
        json!({ "sentiment": "severe_distress", "isDistress": true }),
        1,
    )
    .await;
    mount_flow(&server, REPLY_MARKER, json!({ "reply": "unused" }), 0).await;

    let workspace = TempDir::new().unwrap();
    let services = Services::build(&config_for(&server, &workspace)).await.unwrap();

    let outcome = services
        .pipeline
        .run(&fields(json!({
            "message": "I feel like I can't go on anymore",
            "userId": "u-crisis"
        })))
        .await
        .unwrap();

    assert_eq!(outcome.sentiment, Sentiment::SevereDistress);
    assert_eq!(outcome.referral_message, HELPLINE_MESSAGE);
    assert!(outcome.ai_message.is_empty());

    let turns = services
        .history
        .read(&UserId::parse("u-crisis").unwrap())
        .await
        .unwrap();
    assert_eq!(turns.len(), 1);
    assert_eq!(turns[0].user_message, "I feel like I can't go on anymore");
    assert_eq!(turns[0].sentiment, Sentiment::SevereDistress);
    assert!(turns[0].ai_message.is_empty());
}

#[tokio::test]
async fn anxious_message_gets_supportive_reply() {
    let server = MockServer::start().await;
    mount_flow(
        &server,
        CLASSIFY_MARKER,
        json!({ "sentiment": "anxious", "isDistress": false }),
        1,
    )
    .await;
    mount_flow(
        &server,
        REPLY_MARKER,
        json!({ "reply": "Exams can feel overwhelming. You have prepared more than you think." }),
        1,
    )
    .await;

    let workspace = TempDir::new().unwrap();
    let services = Services::build(&config_for(&server, &workspace)).await.unwrap();

    let outcome = services
        .pipeline
        .run(&fields(json!({
            "message": "I'm feeling really anxious about my exam",
            "userId": "u-exam"
        })))
        .await
        .unwrap();

    assert_eq!(outcome.sentiment, Sentiment::Anxious);
    assert_eq!(
        outcome.ai_message,
        "Exams can feel overwhelming. You have prepared more than you think."
    );
    assert!(outcome.referral_message.is_empty());

    let turns = services
        .history
        .read(&UserId::parse("u-exam").unwrap())
        .await
        .unwrap();
    assert_eq!(turns.len(), 1);
    assert_eq!(turns[0].ai_message, outcome.ai_message);
}

#[tokio::test]
async fn happy_message_is_stored_without_reply() {
    let server = MockServer::start().await;
    mount_flow(
        &server,
        CLASSIFY_MARKER,
        json!({ "sentiment": "happy", "isDistress": false }),
        1,
    )
    .await;
    mount_flow(&server, REPLY_MARKER, json!({ "reply": "unused" }), 0).await;

    let workspace = TempDir::new().unwrap();
    let services = Services::build(&config_for(&server, &workspace)).await.unwrap();

    let outcome = services
        .pipeline
        .run(&fields(json!({ "message": "Passed my exam!", "userId": "u-happy" })))
        .await
        .unwrap();

    assert_eq!(outcome.sentiment, Sentiment::Happy);
    assert!(outcome.ai_message.is_empty());
    assert!(outcome.referral_message.is_empty());
}

#[tokio::test]
async fn whitespace_message_never_reaches_the_model() {
    let server = MockServer::start().await;
    let workspace = TempDir::new().unwrap();
    let services = Services::build(&config_for(&server, &workspace)).await.unwrap();

    let failure = services
        .pipeline
        .run(&fields(json!({ "message": "   ", "userId": "u-blank" })))
        .await
        .unwrap_err();

    assert_eq!(failure.stage, PipelineStage::Validating);
    assert!(failure.user_message().contains("message: must not be empty"));
    assert_eq!(request_count(&server).await, 0);

    let turns = services
        .history
        .read(&UserId::parse("u-blank").unwrap())
        .await
        .unwrap();
    assert!(turns.is_empty());
}

#[tokio::test]
async fn model_outage_fails_at_classification_and_stores_nothing() {
    let server = MockServer::start().await;
    mount_failure(&server, CLASSIFY_MARKER, 500).await;

    let workspace = TempDir::new().unwrap();
    let services = Services::build(&config_for(&server, &workspace)).await.unwrap();

    let failure = services
        .pipeline
        .run(&fields(json!({ "message": "rough day", "userId": "u-outage" })))
        .await
        .unwrap_err();

    assert_eq!(failure.stage, PipelineStage::Classifying);
    assert_eq!(failure.user_message(), SEND_FAILURE_MESSAGE);
    assert!(failure.error.is_model_failure());

    let turns = services
        .history
        .read(&UserId::parse("u-outage").unwrap())
        .await
        .unwrap();
    assert!(turns.is_empty());
}

#[tokio::test]
async fn model_confirmed_referral_asks_the_model() {
    let server = MockServer::start().await;
    mount_flow(
        &server,
        CLASSIFY_MARKER,
        json!({ "sentiment": "severe_distress", "isDistress": true }),
        1,
    )
    .await;
    mount_flow(
        &server,
        REFER_MARKER,
        json!({ "shouldRefer": true, "referralMessage": "call someone now" }),
        1,
    )
    .await;

    let workspace = TempDir::new().unwrap();
    let mut config = config_for(&server, &workspace);
    config.pipeline.referral_policy = ReferralPolicy::ModelConfirmed;
    let services = Services::build(&config).await.unwrap();

    let outcome = services
        .pipeline
        .run(&fields(json!({
            "message": "I want to hurt myself",
            "userId": "u-confirm"
        })))
        .await
        .unwrap();

    assert_eq!(outcome.referral_message, HELPLINE_MESSAGE);
    assert!(outcome.ai_message.is_empty());
}
