//! Message-processing pipeline: validate, classify, refer, reply, persist.

pub mod classifier;
mod flow;
pub mod history;
pub mod orchestrator;
pub mod referral;
pub mod reply;
pub mod sentiment;
pub mod unified;
pub mod validate;

#[cfg(test)]
pub(crate) mod test_support;

pub use classifier::SentimentClassifier;
pub use history::{ERASE_FAILURE_MESSAGE, EraseFailure, HistoryService};
pub use orchestrator::{
    MessageOutcome, MessagePipeline, PipelineFailure, PipelineStage, SEND_FAILURE_MESSAGE,
};
pub use referral::{HELPLINE_MESSAGE, ReferralResolver, resolve_referral};
pub use reply::{ReplyGenerator, clip_reply};
pub use sentiment::{Sentiment, SentimentClassification};
pub use unified::{UnifiedResponder, UnifiedVerdict};
pub use validate::{
    MESSAGE_FIELD, NonEmptyText, RawFields, SendMessageRequest, USER_ID_FIELD, UserId,
    validate_send_message, validate_user_id,
};
