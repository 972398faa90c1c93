use super::Config;
use std::path::PathBuf;

impl Config {
    pub fn apply_env_overrides(&mut self) {
        if let Some(key) = ["MENTALCARE_API_KEY", "GEMINI_API_KEY", "GOOGLE_API_KEY"]
            .iter()
            .find_map(|name| std::env::var(name).ok().filter(|v| !v.trim().is_empty()))
        {
            self.api_key = Some(key);
        }

        if let Ok(model) = std::env::var("MENTALCARE_MODEL")
            && !model.is_empty()
        {
            self.llm.model = model;
        }

        if let Ok(temp_str) = std::env::var("MENTALCARE_TEMPERATURE")
            && let Ok(temp) = temp_str.parse::<f64>()
            && (0.0..=2.0).contains(&temp)
        {
            self.llm.temperature = temp;
        }

        if let Ok(workspace) = std::env::var("MENTALCARE_WORKSPACE")
            && !workspace.is_empty()
        {
            self.workspace_dir = PathBuf::from(workspace);
        }

        if let Ok(port_str) =
            std::env::var("MENTALCARE_GATEWAY_PORT").or_else(|_| std::env::var("PORT"))
            && let Ok(port) = port_str.parse::<u16>()
        {
            self.gateway.port = port;
        }

        if let Ok(host) = std::env::var("MENTALCARE_GATEWAY_HOST")
            && !host.is_empty()
        {
            self.gateway.host = host;
        }
    }
}
