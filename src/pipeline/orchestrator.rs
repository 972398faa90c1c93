//! Sequences validation, classification, referral, reply and persistence for
//! one submitted message.

use super::classifier::SentimentClassifier;
use super::flow::ModelFlow;
use super::referral::ReferralResolver;
use super::reply::ReplyGenerator;
use super::sentiment::{Sentiment, SentimentClassification};
use super::unified::UnifiedResponder;
use super::validate::{RawFields, SendMessageRequest, validate_send_message};
use crate::config::{Config, PipelineMode, ReferralPolicy};
use crate::error::CareError;
use crate::llm::Provider;
use crate::prompt::PromptLibrary;
use crate::store::{ConversationStore, NewTurn};
use serde::Serialize;
use std::sync::Arc;

pub const SEND_FAILURE_MESSAGE: &str =
    "An error occurred while processing your message. Please try again.";

/// Steps of one run. Any step may end the run in failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum PipelineStage {
    Validating,
    Classifying,
    ReferralCheck,
    Replying,
    Persisting,
    Done,
}

#[derive(Debug, thiserror::Error)]
#[error("message pipeline failed while {stage}: {error}")]
pub struct PipelineFailure {
    pub stage: PipelineStage,
    #[source]
    pub error: CareError,
}

impl PipelineFailure {
    fn at(stage: PipelineStage) -> impl FnOnce(CareError) -> Self {
        move |error| Self { stage, error }
    }

    /// The single string shown to the end user.
    pub fn user_message(&self) -> String {
        match &self.error {
            CareError::Validation(err) => err.user_message(),
            _ => SEND_FAILURE_MESSAGE.to_string(),
        }
    }
}

/// Result of a successful run. Both strings may be empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageOutcome {
    pub ai_message: String,
    pub referral_message: String,
    pub sentiment: Sentiment,
}

enum Responder {
    Staged {
        classifier: SentimentClassifier,
        reply: ReplyGenerator,
    },
    Unified(UnifiedResponder),
}

pub struct MessagePipeline {
    responder: Responder,
    referral: ReferralResolver,
    conversations: Arc<dyn ConversationStore>,
}

impl MessagePipeline {
    pub fn new(
        config: &Config,
        provider: Arc<dyn Provider>,
        prompts: Arc<PromptLibrary>,
        conversations: Arc<dyn ConversationStore>,
    ) -> Self {
        let llm = &config.llm;
        let classify_flow = ModelFlow::new(provider.clone(), &llm.model, llm.temperature);
        let reply_flow = ModelFlow::new(provider, llm.reply_model(), llm.temperature);

        let responder = match config.pipeline.mode {
            PipelineMode::Staged => Responder::Staged {
                classifier: SentimentClassifier::new(classify_flow.clone(), prompts.clone()),
                reply: ReplyGenerator::new(reply_flow, prompts.clone()),
            },
            PipelineMode::Unified => {
                Responder::Unified(UnifiedResponder::new(classify_flow.clone(), prompts.clone()))
            }
        };

        Self {
            responder,
            referral: ReferralResolver::new(config.pipeline.referral_policy, classify_flow, prompts),
            conversations,
        }
    }

    pub fn mode(&self) -> PipelineMode {
        match self.responder {
            Responder::Staged { .. } => PipelineMode::Staged,
            Responder::Unified(_) => PipelineMode::Unified,
        }
    }

    pub fn referral_policy(&self) -> ReferralPolicy {
        self.referral.policy()
    }

    /// Validate raw fields, then process them.
    pub async fn run(&self, fields: &RawFields) -> Result<MessageOutcome, PipelineFailure> {
        tracing::debug!(stage = %PipelineStage::Validating, "pipeline stage");
        let request = validate_send_message(fields)
            .map_err(CareError::from)
            .map_err(PipelineFailure::at(PipelineStage::Validating))?;
        self.process(&request).await
    }

    /// Process an already validated message.
    pub async fn process(
        &self,
        request: &SendMessageRequest,
    ) -> Result<MessageOutcome, PipelineFailure> {
        let user_id = request.user_id.as_str();
        let result = self.process_inner(request).await;
        match &result {
            Ok(outcome) => tracing::info!(
                user_id,
                sentiment = %outcome.sentiment,
                referred = !outcome.referral_message.is_empty(),
                replied = !outcome.ai_message.is_empty(),
                "message processed"
            ),
            Err(failure) => tracing::warn!(
                user_id,
                stage = %failure.stage,
                error = %failure.error,
                "message pipeline failed"
            ),
        }
        result
    }

    async fn process_inner(
        &self,
        request: &SendMessageRequest,
    ) -> Result<MessageOutcome, PipelineFailure> {
        let message = request.message.as_str();

        stage(PipelineStage::Classifying);
        let (classification, unified_reply) = match &self.responder {
            Responder::Staged { classifier, .. } => (
                classifier
                    .classify(message)
                    .await
                    .map_err(PipelineFailure::at(PipelineStage::Classifying))?,
                None,
            ),
            Responder::Unified(unified) => {
                let verdict = unified
                    .respond(message)
                    .await
                    .map_err(PipelineFailure::at(PipelineStage::Classifying))?;
                (verdict.classification, Some(verdict.ai_message))
            }
        };

        stage(PipelineStage::ReferralCheck);
        let referral_message = self
            .referral
            .resolve(&classification, message)
            .await
            .map_err(PipelineFailure::at(PipelineStage::ReferralCheck))?;

        stage(PipelineStage::Replying);
        let ai_message = match (&self.responder, unified_reply) {
            (_, Some(reply)) => reply,
            (Responder::Staged { reply, .. }, None) => reply
                .generate(classification.sentiment, message)
                .await
                .map_err(PipelineFailure::at(PipelineStage::Replying))?,
            (Responder::Unified(_), None) => String::new(),
        };

        stage(PipelineStage::Persisting);
        self.persist(request, &classification, &ai_message)
            .await
            .map_err(PipelineFailure::at(PipelineStage::Persisting))?;

        stage(PipelineStage::Done);
        Ok(MessageOutcome {
            ai_message,
            referral_message: referral_message.to_string(),
            sentiment: classification.sentiment,
        })
    }

    async fn persist(
        &self,
        request: &SendMessageRequest,
        classification: &SentimentClassification,
        ai_message: &str,
    ) -> Result<(), CareError> {
        self.conversations
            .append_turn(NewTurn {
                user_id: request.user_id.as_str(),
                user_message: request.message.as_str(),
                ai_message,
                sentiment: classification.sentiment,
            })
            .await?;
        Ok(())
    }
}

fn stage(stage: PipelineStage) {
    tracing::debug!(stage = %stage, "pipeline stage");
}
