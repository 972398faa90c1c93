// ── Infrastructure ───────────────────────────────────────────────────────────
pub mod http_client;
pub mod scrub;
pub mod structured;
pub mod traits;

// ── Provider implementations ────────────────────────────────────────────────
pub mod factory;
pub mod gemini;

// ── Re-exports ──────────────────────────────────────────────────────────────
pub use factory::create_provider;
pub use gemini::GeminiProvider;
pub use http_client::build_provider_client_with_timeout;
pub use scrub::{sanitize_api_error, scrub_secret_patterns};
pub use structured::{
    CRISIS_SAFETY_SETTINGS, HarmBlockThreshold, HarmCategory, SafetySetting, StructuredRequest,
    parse_structured,
};
pub use traits::{Provider, ProviderFuture};
