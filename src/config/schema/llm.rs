use anyhow::{Result, ensure};
use serde::{Deserialize, Serialize};

pub const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Provider name (only "gemini" is built in)
    #[serde(default = "default_provider")]
    pub provider: String,
    /// Model used for classification and unified runs
    #[serde(default = "default_model")]
    pub model: String,
    /// Optional separate model for supportive replies
    #[serde(default)]
    pub reply_model: Option<String>,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    /// API base URL, overridable for proxies and tests
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,
}

fn default_provider() -> String {
    "gemini".into()
}

fn default_model() -> String {
    "gemini-2.5-flash".into()
}

fn default_temperature() -> f64 {
    0.7
}

fn default_base_url() -> String {
    GEMINI_API_BASE.into()
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_max_output_tokens() -> u32 {
    1024
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_model(),
            reply_model: None,
            temperature: default_temperature(),
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            max_output_tokens: default_max_output_tokens(),
        }
    }
}

impl LlmConfig {
    pub fn reply_model(&self) -> &str {
        self.reply_model.as_deref().unwrap_or(&self.model)
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(
            (0.0..=2.0).contains(&self.temperature),
            "llm.temperature must be within 0.0..=2.0 (got {})",
            self.temperature
        );
        ensure!(!self.model.trim().is_empty(), "llm.model must not be empty");
        ensure!(self.timeout_secs > 0, "llm.timeout_secs must be positive");
        ensure!(
            self.max_output_tokens > 0,
            "llm.max_output_tokens must be positive"
        );
        ensure!(
            self.base_url.starts_with("http://") || self.base_url.starts_with("https://"),
            "llm.base_url must be an http(s) URL"
        );
        Ok(())
    }
}
