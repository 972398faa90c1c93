use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Fixed sentiment taxonomy the classifier must choose from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Sentiment {
    Happy,
    Sad,
    Anxious,
    Stressed,
    Neutral,
    /// Self-harm, suicidal ideation or acute crisis language.
    SevereDistress,
}

impl Sentiment {
    pub const ALL: [Self; 6] = [
        Self::Happy,
        Self::Sad,
        Self::Anxious,
        Self::Stressed,
        Self::Neutral,
        Self::SevereDistress,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Happy => "happy",
            Self::Sad => "sad",
            Self::Anxious => "anxious",
            Self::Stressed => "stressed",
            Self::Neutral => "neutral",
            Self::SevereDistress => "severe_distress",
        }
    }

    /// Only these sentiments get a supportive reply.
    pub const fn warrants_reply(self) -> bool {
        matches!(self, Self::Sad | Self::Anxious | Self::Stressed)
    }

    pub const fn is_distress(self) -> bool {
        matches!(self, Self::SevereDistress)
    }

    /// Parse a model label, tolerating case, padding and space or hyphen separators.
    pub fn parse_label(raw: &str) -> Option<Self> {
        let normalized = raw
            .trim()
            .to_ascii_lowercase()
            .split(|c: char| c.is_whitespace() || c == '-' || c == '_')
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join("_");
        Self::ALL
            .into_iter()
            .find(|sentiment| sentiment.as_str() == normalized)
    }

    pub fn labels() -> Vec<&'static str> {
        Self::ALL.iter().map(|s| s.as_str()).collect()
    }
}

impl FromStr for Sentiment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_label(s).ok_or_else(|| format!("unknown sentiment label: {s:?}"))
    }
}

/// Classifier verdict for one message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SentimentClassification {
    pub sentiment: Sentiment,
    pub is_distress: bool,
}

impl SentimentClassification {
    /// Combine the model's label and flag; either distress signal wins.
    pub fn reconcile(sentiment: Sentiment, is_distress: bool) -> Self {
        if sentiment.is_distress() == is_distress {
            return Self {
                sentiment,
                is_distress,
            };
        }
        tracing::warn!(
            %sentiment,
            is_distress,
            "classifier label and distress flag disagree; treating as severe distress"
        );
        Self {
            sentiment: Sentiment::SevereDistress,
            is_distress: true,
        }
    }
}
