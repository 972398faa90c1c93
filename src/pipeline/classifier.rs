use super::flow::ModelFlow;
use super::sentiment::{Sentiment, SentimentClassification};
use crate::error::CareError;
use crate::prompt::{CLASSIFY_SENTIMENT, PromptLibrary};
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::{Arc, LazyLock};

static CLASSIFY_SCHEMA: LazyLock<Value> = LazyLock::new(|| {
    json!({
        "type": "OBJECT",
        "properties": {
            "sentiment": {
                "type": "STRING",
                "format": "enum",
                "enum": Sentiment::labels(),
            },
            "isDistress": { "type": "BOOLEAN" }
        },
        "required": ["sentiment", "isDistress"]
    })
});

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawClassification {
    sentiment: String,
    is_distress: bool,
}

/// Decode a label/flag pair from the model, reconciling disagreement toward safety.
pub(crate) fn interpret_classification(
    flow: &'static str,
    label: &str,
    is_distress: bool,
) -> Result<SentimentClassification, CareError> {
    let sentiment = Sentiment::parse_label(label)
        .ok_or_else(|| CareError::malformed(flow, format!("unknown sentiment label {label:?}")))?;
    Ok(SentimentClassification::reconcile(sentiment, is_distress))
}

/// Labels a message with one sentiment and a distress flag.
pub struct SentimentClassifier {
    flow: ModelFlow,
    prompts: Arc<PromptLibrary>,
}

impl SentimentClassifier {
    pub(crate) fn new(flow: ModelFlow, prompts: Arc<PromptLibrary>) -> Self {
        Self { flow, prompts }
    }

    pub async fn classify(&self, message: &str) -> Result<SentimentClassification, CareError> {
        let prompt = self.prompts.classify_sentiment(message)?;
        let raw: RawClassification = self
            .flow
            .call(CLASSIFY_SENTIMENT, &prompt, &CLASSIFY_SCHEMA)
            .await?;
        interpret_classification(CLASSIFY_SENTIMENT, &raw.sentiment, raw.is_distress)
    }
}
