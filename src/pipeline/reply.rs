use super::flow::ModelFlow;
use super::sentiment::Sentiment;
use crate::error::CareError;
use crate::prompt::{PromptLibrary, SUPPORTIVE_REPLY};
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::{Arc, LazyLock};

const MAX_REPLY_SENTENCES: usize = 2;

static REPLY_SCHEMA: LazyLock<Value> = LazyLock::new(|| {
    json!({
        "type": "OBJECT",
        "properties": { "reply": { "type": "STRING" } },
        "required": ["reply"]
    })
});

#[derive(Debug, Deserialize)]
struct RawReply {
    reply: String,
}

/// Trim and keep at most two sentences.
pub fn clip_reply(text: &str) -> String {
    let text = text.trim();
    let mut sentences = 0;
    let mut chars = text.char_indices().peekable();
    while let Some((idx, c)) = chars.next() {
        if !matches!(c, '.' | '!' | '?') {
            continue;
        }
        let at_boundary = chars.peek().is_none_or(|(_, next)| next.is_whitespace());
        if at_boundary {
            sentences += 1;
            if sentences == MAX_REPLY_SENTENCES {
                return text[..idx + c.len_utf8()].to_string();
            }
        }
    }
    text.to_string()
}

/// Writes a short empathetic reply for sentiments that warrant one.
pub struct ReplyGenerator {
    flow: ModelFlow,
    prompts: Arc<PromptLibrary>,
}

impl ReplyGenerator {
    pub(crate) fn new(flow: ModelFlow, prompts: Arc<PromptLibrary>) -> Self {
        Self { flow, prompts }
    }

    /// Returns `""` without calling the model unless the sentiment is sad, anxious or stressed.
    pub async fn generate(&self, sentiment: Sentiment, user_message: &str) -> Result<String, CareError> {
        if !sentiment.warrants_reply() {
            return Ok(String::new());
        }
        let prompt = self
            .prompts
            .supportive_reply(sentiment.as_str(), user_message)?;
        let raw: RawReply = self
            .flow
            .call(SUPPORTIVE_REPLY, &prompt, &REPLY_SCHEMA)
            .await?;
        Ok(clip_reply(&raw.reply))
    }
}
