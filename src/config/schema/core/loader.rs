use super::Config;
use anyhow::{Context, Result};
use directories::UserDirs;
use std::fs;
use std::path::Path;

impl Config {
    /// Load `~/.mentalcare/config.toml`, writing defaults on first run, then
    /// apply environment overrides and validate.
    pub fn load_or_init() -> Result<Self> {
        let home = UserDirs::new()
            .map(|u| u.home_dir().to_path_buf())
            .context("Could not find home directory")?;
        let mentalcare_dir = home.join(".mentalcare");
        let config_path = mentalcare_dir.join("config.toml");

        if !mentalcare_dir.exists() {
            fs::create_dir_all(mentalcare_dir.join("workspace"))
                .context("Failed to create .mentalcare workspace directory")?;
        }

        let mut config = if config_path.exists() {
            Self::load_from(&config_path)?
        } else {
            let config = Self {
                config_path: config_path.clone(),
                workspace_dir: mentalcare_dir.join("workspace"),
                ..Self::default()
            };
            config.save()?;
            tracing::info!(path = %config_path.display(), "wrote default config");
            config
        };

        config.workspace_dir = mentalcare_dir.join("workspace");
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Parse a config file without touching the environment.
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let mut config: Config =
            toml::from_str(&contents).context("Failed to parse config file")?;
        config.config_path = path.to_path_buf();
        if let Some(parent) = path.parent() {
            config.workspace_dir = parent.join("workspace");
        }
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }
        let toml_str = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(&self.config_path, toml_str).context("Failed to write config file")?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        self.llm.validate()?;
        self.store.validate()?;
        self.gateway.validate()?;
        Ok(())
    }
}
