use serde::{Deserialize, Serialize};

/// How many model calls one message costs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PipelineMode {
    /// Classifier call, then a reply call when the sentiment warrants one.
    #[default]
    Staged,
    /// One call returns sentiment, distress flag and reply together.
    Unified,
}

/// Who decides whether a distressed user sees the helpline message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ReferralPolicy {
    /// Pure function of the classifier's distress flag.
    #[default]
    Flag,
    /// A second model call confirms the referral.
    ModelConfirmed,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default)]
    pub mode: PipelineMode,
    #[serde(default)]
    pub referral_policy: ReferralPolicy,
}
