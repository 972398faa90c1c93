//! Request shape and response decoding shared by every structured model flow.

use crate::error::CareError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HarmCategory {
    #[serde(rename = "HARM_CATEGORY_DANGEROUS_CONTENT")]
    DangerousContent,
    #[serde(rename = "HARM_CATEGORY_HARASSMENT")]
    Harassment,
    #[serde(rename = "HARM_CATEGORY_HATE_SPEECH")]
    HateSpeech,
    #[serde(rename = "HARM_CATEGORY_SEXUALLY_EXPLICIT")]
    SexuallyExplicit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HarmBlockThreshold {
    BlockNone,
    BlockOnlyHigh,
    BlockMediumAndAbove,
    BlockLowAndAbove,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SafetySetting {
    pub category: HarmCategory,
    pub threshold: HarmBlockThreshold,
}

/// Self-harm disclosures must reach the classifier unfiltered.
pub const CRISIS_SAFETY_SETTINGS: [SafetySetting; 1] = [SafetySetting {
    category: HarmCategory::DangerousContent,
    threshold: HarmBlockThreshold::BlockNone,
}];

/// One structured model call.
#[derive(Debug, Clone, Copy)]
pub struct StructuredRequest<'a> {
    /// Flow name, used in logs and error messages.
    pub flow: &'static str,
    pub prompt: &'a str,
    pub response_schema: &'a Value,
    pub model: &'a str,
    pub temperature: f64,
    pub safety_settings: &'a [SafetySetting],
}

/// Decode a model's JSON answer, tolerating a Markdown code fence around it.
pub fn parse_structured<T: DeserializeOwned>(
    flow: &'static str,
    raw: &str,
) -> Result<T, CareError> {
    let body = strip_code_fence(raw.trim());
    if body.is_empty() {
        return Err(CareError::malformed(flow, "empty response"));
    }
    serde_json::from_str(body).map_err(|e| CareError::malformed(flow, e.to_string()))
}

fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}
