use super::gemini::GeminiProvider;
use super::traits::Provider;
use crate::config::Config;
use std::sync::Arc;

/// Build the configured model provider.
///
/// A missing API key is not an error here; the first model call reports it,
/// so read-only commands (`history`, `navigate`) keep working without one.
pub fn create_provider(config: &Config) -> anyhow::Result<Arc<dyn Provider>> {
    let api_key = config.api_key.as_deref();

    match config.llm.provider.as_str() {
        "gemini" | "google" | "google-gemini" => {
            let provider = GeminiProvider::from_config(api_key, &config.llm);
            if !provider.has_api_key() {
                tracing::warn!(
                    provider = "gemini",
                    "no API key configured; set MENTALCARE_API_KEY or GEMINI_API_KEY"
                );
            }
            Ok(Arc::new(provider))
        }
        other => anyhow::bail!("Unknown provider: {other}. Supported: gemini"),
    }
}
