use super::flow::ModelFlow;
use super::sentiment::SentimentClassification;
use crate::config::ReferralPolicy;
use crate::error::CareError;
use crate::prompt::{PromptLibrary, REFER_USER};
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::{Arc, LazyLock};

/// Shown verbatim whenever distress is detected.
pub const HELPLINE_MESSAGE: &str = "⚠️ Please reach out to a professional. Helpline: +91-9876543210";

/// The helpline text when `is_distress`, otherwise the empty string.
pub const fn resolve_referral(is_distress: bool) -> &'static str {
    if is_distress { HELPLINE_MESSAGE } else { "" }
}

static REFER_SCHEMA: LazyLock<Value> = LazyLock::new(|| {
    json!({
        "type": "OBJECT",
        "properties": {
            "shouldRefer": { "type": "BOOLEAN" },
            "referralMessage": { "type": "STRING" }
        },
        "required": ["shouldRefer", "referralMessage"]
    })
});

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReferralDecision {
    should_refer: bool,
    // Decoded to enforce the schema; the fixed helpline text is shown instead.
    #[allow(dead_code)]
    referral_message: String,
}

pub struct ReferralResolver {
    policy: ReferralPolicy,
    flow: ModelFlow,
    prompts: Arc<PromptLibrary>,
}

impl ReferralResolver {
    pub(crate) fn new(policy: ReferralPolicy, flow: ModelFlow, prompts: Arc<PromptLibrary>) -> Self {
        Self {
            policy,
            flow,
            prompts,
        }
    }

    pub fn policy(&self) -> ReferralPolicy {
        self.policy
    }

    pub async fn resolve(
        &self,
        classification: &SentimentClassification,
        message: &str,
    ) -> Result<&'static str, CareError> {
        if !classification.is_distress {
            return Ok("");
        }
        match self.policy {
            ReferralPolicy::Flag => Ok(resolve_referral(true)),
            ReferralPolicy::ModelConfirmed => {
                let prompt = self.prompts.refer_user_in_distress(message)?;
                let decision: ReferralDecision =
                    self.flow.call(REFER_USER, &prompt, &REFER_SCHEMA).await?;
                if !decision.should_refer {
                    tracing::info!("referral check declined to refer a distress-flagged message");
                }
                Ok(resolve_referral(decision.should_refer))
            }
        }
    }
}
