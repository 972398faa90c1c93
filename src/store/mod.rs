pub mod factory;
pub mod sqlite;
pub mod traits;
pub mod types;

pub use factory::open_store;
pub use sqlite::SqliteStore;
pub use traits::{ConversationStore, ProfileStore, StoreFuture};
pub use types::{ConversationTurn, NewTurn, UserProfile};
