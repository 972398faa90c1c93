mod core;
mod gateway;
mod llm;
mod pipeline;
mod store;

pub use core::Config;
pub use gateway::{GatewayConfig, is_public_bind};
pub use llm::{GEMINI_API_BASE, LlmConfig};
pub use pipeline::{PipelineConfig, PipelineMode, ReferralPolicy};
pub use store::{IN_MEMORY_STORE, StoreConfig};
