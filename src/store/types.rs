use crate::pipeline::Sentiment;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// One persisted exchange. Immutable once written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationTurn {
    pub id: String,
    pub user_id: String,
    pub user_message: String,
    /// Empty when no reply was produced.
    pub ai_message: String,
    pub sentiment: Sentiment,
    /// Store-assigned, strictly increasing across the store.
    pub timestamp: DateTime<Utc>,
}

/// Fields the caller supplies for a new turn; the store assigns id and timestamp.
#[derive(Debug, Clone, Copy)]
pub struct NewTurn<'a> {
    pub user_id: &'a str,
    pub user_message: &'a str,
    pub ai_message: &'a str,
    pub sentiment: Sentiment,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub user_id: String,
    pub full_name: String,
    pub date_of_birth: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub updated_at: DateTime<Utc>,
}
