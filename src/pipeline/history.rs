use super::validate::{RawFields, UserId, validate_user_id};
use crate::error::CareError;
use crate::store::{ConversationStore, ConversationTurn};
use std::sync::Arc;

pub const ERASE_FAILURE_MESSAGE: &str = "An error occurred while deleting your history.";

#[derive(Debug, thiserror::Error)]
#[error("history erase failed: {0}")]
pub struct EraseFailure(#[from] pub CareError);

impl EraseFailure {
    pub fn error(&self) -> &CareError {
        &self.0
    }

    pub fn user_message(&self) -> String {
        match &self.0 {
            CareError::Validation(err) => err.user_message(),
            _ => ERASE_FAILURE_MESSAGE.to_string(),
        }
    }
}

/// Read-back and bulk erase of a user's conversation log.
pub struct HistoryService {
    conversations: Arc<dyn ConversationStore>,
}

impl HistoryService {
    pub fn new(conversations: Arc<dyn ConversationStore>) -> Self {
        Self { conversations }
    }

    /// Validate an erase form, then erase.
    pub async fn erase(&self, fields: &RawFields) -> Result<u64, EraseFailure> {
        let user_id = validate_user_id(fields).map_err(CareError::from)?;
        self.erase_user(&user_id).await
    }

    /// Delete every turn of the user at once. Erasing an empty history succeeds.
    pub async fn erase_user(&self, user_id: &UserId) -> Result<u64, EraseFailure> {
        match self.conversations.delete_user_turns(user_id.as_str()).await {
            Ok(deleted) => {
                tracing::info!(user_id = user_id.as_str(), deleted, "history erased");
                Ok(deleted)
            }
            Err(error) => {
                tracing::warn!(user_id = user_id.as_str(), %error, "history erase failed");
                Err(CareError::from(error).into())
            }
        }
    }

    /// The user's turns, oldest first.
    pub async fn read(&self, user_id: &UserId) -> Result<Vec<ConversationTurn>, CareError> {
        Ok(self.conversations.turns_for_user(user_id.as_str()).await?)
    }
}
