use crate::config::Config;

fn on_off(flag: bool) -> &'static str {
    if flag { "on" } else { "off" }
}

pub fn render_status(config: &Config) -> String {
    let store_location = config.store.resolve_path(&config.workspace_dir).map_or_else(
        || "in-memory".to_string(),
        |path| path.display().to_string(),
    );
    let api_key_set = config
        .api_key
        .as_deref()
        .is_some_and(|key| !key.trim().is_empty());

    let lines = [
        format!("MentalCare v{}", env!("CARGO_PKG_VERSION")),
        String::new(),
        format!("  Config:        {}", config.config_path.display()),
        format!("  Workspace:     {}", config.workspace_dir.display()),
        String::new(),
        "Model".to_string(),
        format!("  Provider:      {}", config.llm.provider),
        format!("  Model:         {}", config.llm.model),
        format!("  Reply model:   {}", config.llm.reply_model()),
        format!("  Temperature:   {:.2}", config.llm.temperature),
        format!("  Timeout:       {}s", config.llm.timeout_secs),
        format!(
            "  API key:       {}",
            if api_key_set { "✓ set" } else { "✗ missing" }
        ),
        String::new(),
        "Pipeline".to_string(),
        format!("  Mode:          {}", config.pipeline.mode),
        format!("  Referral:      {}", config.pipeline.referral_policy),
        String::new(),
        "Store".to_string(),
        format!("  Location:      {store_location}"),
        format!("  Connections:   {}", config.store.max_connections),
        String::new(),
        "Gateway".to_string(),
        format!("  Bind:          {}:{}", config.gateway.host, config.gateway.port),
        format!("  Bearer auth:   {}", on_off(config.gateway.requires_auth())),
        format!(
            "  Public bind:   {}",
            on_off(config.gateway.allow_public_bind)
        ),
    ];

    lines.join("\n")
}
