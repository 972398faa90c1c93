pub mod schema;

pub use schema::{
    Config, GEMINI_API_BASE, GatewayConfig, IN_MEMORY_STORE, LlmConfig, PipelineConfig,
    PipelineMode, ReferralPolicy, StoreConfig, is_public_bind,
};
