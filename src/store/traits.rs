use super::types::{ConversationTurn, NewTurn, UserProfile};
use crate::error::StoreError;
use std::future::Future;
use std::pin::Pin;

pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + Send + 'a>>;

/// Append-only per-user conversation log.
pub trait ConversationStore: Send + Sync {
    /// Persist one turn. Never updates an existing record.
    fn append_turn<'a>(&'a self, turn: NewTurn<'a>) -> StoreFuture<'a, ConversationTurn>;

    /// Every turn of `user_id`, oldest first.
    fn turns_for_user<'a>(&'a self, user_id: &'a str) -> StoreFuture<'a, Vec<ConversationTurn>>;

    /// Remove every turn of `user_id` in one transaction; returns how many went.
    fn delete_user_turns<'a>(&'a self, user_id: &'a str) -> StoreFuture<'a, u64>;
}

pub trait ProfileStore: Send + Sync {
    fn upsert_profile<'a>(&'a self, profile: &'a UserProfile) -> StoreFuture<'a, ()>;

    fn load_profile<'a>(&'a self, user_id: &'a str) -> StoreFuture<'a, Option<UserProfile>>;
}
