use super::super::{GatewayConfig, LlmConfig, PipelineConfig, StoreConfig};
use directories::UserDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Workspace directory - computed from home, not serialized
    #[serde(skip)]
    pub workspace_dir: PathBuf,
    /// Path to config.toml - computed from home, not serialized
    #[serde(skip)]
    pub config_path: PathBuf,
    /// Gemini API key. Environment variables take precedence.
    pub api_key: Option<String>,

    #[serde(default)]
    pub llm: LlmConfig,

    #[serde(default)]
    pub pipeline: PipelineConfig,

    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub gateway: GatewayConfig,
}

impl Default for Config {
    fn default() -> Self {
        let home =
            UserDirs::new().map_or_else(|| PathBuf::from("."), |u| u.home_dir().to_path_buf());
        let mentalcare_dir = home.join(".mentalcare");

        Self {
            workspace_dir: mentalcare_dir.join("workspace"),
            config_path: mentalcare_dir.join("config.toml"),
            api_key: None,
            llm: LlmConfig::default(),
            pipeline: PipelineConfig::default(),
            store: StoreConfig::default(),
            gateway: GatewayConfig::default(),
        }
    }
}
