mod builder;
mod engine;

pub use builder::{CLASSIFY_SENTIMENT, PROCESS_MESSAGE, PromptLibrary, REFER_USER, SUPPORTIVE_REPLY};
pub use engine::TeraEngine;
