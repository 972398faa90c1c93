use super::classifier::interpret_classification;
use super::flow::ModelFlow;
use super::reply::clip_reply;
use super::sentiment::{Sentiment, SentimentClassification};
use crate::error::CareError;
use crate::prompt::{PROCESS_MESSAGE, PromptLibrary};
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::{Arc, LazyLock};

static PROCESS_SCHEMA: LazyLock<Value> = LazyLock::new(|| {
    json!({
        "type": "OBJECT",
        "properties": {
            "sentiment": {
                "type": "STRING",
                "format": "enum",
                "enum": Sentiment::labels(),
            },
            "isDistress": { "type": "BOOLEAN" },
            "aiMessage": { "type": "STRING" }
        },
        "required": ["sentiment", "isDistress", "aiMessage"]
    })
});

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawVerdict {
    sentiment: String,
    is_distress: bool,
    ai_message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnifiedVerdict {
    pub classification: SentimentClassification,
    /// Already blanked for sentiments that get no reply.
    pub ai_message: String,
}

/// Classification and reply in a single model call.
pub struct UnifiedResponder {
    flow: ModelFlow,
    prompts: Arc<PromptLibrary>,
}

impl UnifiedResponder {
    pub(crate) fn new(flow: ModelFlow, prompts: Arc<PromptLibrary>) -> Self {
        Self { flow, prompts }
    }

    pub async fn respond(&self, message: &str) -> Result<UnifiedVerdict, CareError> {
        let prompt = self.prompts.process_message(message)?;
        let raw: RawVerdict = self
            .flow
            .call(PROCESS_MESSAGE, &prompt, &PROCESS_SCHEMA)
            .await?;
        let classification =
            interpret_classification(PROCESS_MESSAGE, &raw.sentiment, raw.is_distress)?;

        let ai_message = if classification.sentiment.warrants_reply() {
            clip_reply(&raw.ai_message)
        } else {
            if !raw.ai_message.trim().is_empty() {
                tracing::debug!(
                    sentiment = %classification.sentiment,
                    "dropping model reply for sentiment without replies"
                );
            }
            String::new()
        };

        Ok(UnifiedVerdict {
            classification,
            ai_message,
        })
    }
}
