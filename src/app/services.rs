//! Process-wide handles for the model provider and the store.

use crate::config::Config;
use crate::diagnostics::health::{self, MODEL_COMPONENT, STORE_COMPONENT};
use crate::llm::{Provider, create_provider};
use crate::pipeline::{HistoryService, MessagePipeline};
use crate::profile::ProfileService;
use crate::prompt::PromptLibrary;
use crate::store::{SqliteStore, open_store};
use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::sync::OnceCell;

/// Everything a request needs, built once and shared.
pub struct Services {
    pub provider: Arc<dyn Provider>,
    pub store: Arc<SqliteStore>,
    pub pipeline: MessagePipeline,
    pub history: HistoryService,
    pub profiles: ProfileService,
}

impl Services {
    /// Open the store and build the configured provider.
    pub async fn build(config: &Config) -> Result<Self> {
        let provider = create_provider(config)?;
        if config.api_key.as_deref().is_some_and(|k| !k.trim().is_empty()) {
            health::mark_component_starting(MODEL_COMPONENT);
        } else {
            health::mark_component_error(MODEL_COMPONENT, "no API key configured");
        }

        let store = match open_store(config).await {
            Ok(store) => {
                health::mark_component_ok(STORE_COMPONENT);
                Arc::new(store)
            }
            Err(error) => {
                health::mark_component_error(STORE_COMPONENT, &error);
                return Err(error);
            }
        };

        Self::from_parts(config, provider, store)
    }

    /// Assemble from an existing provider and store.
    pub fn from_parts(
        config: &Config,
        provider: Arc<dyn Provider>,
        store: Arc<SqliteStore>,
    ) -> Result<Self> {
        let prompts = Arc::new(PromptLibrary::new().context("Failed to register prompt templates")?);
        let pipeline = MessagePipeline::new(config, provider.clone(), prompts, store.clone());

        tracing::debug!(
            provider = provider.name(),
            mode = %pipeline.mode(),
            referral_policy = %pipeline.referral_policy(),
            "services ready"
        );

        Ok(Self {
            history: HistoryService::new(store.clone()),
            profiles: ProfileService::new(store.clone()),
            provider,
            store,
            pipeline,
        })
    }
}

static SERVICES: OnceCell<Arc<Services>> = OnceCell::const_new();

/// The process-wide instance, built on first use and reused afterwards.
pub async fn shared(config: &Config) -> Result<Arc<Services>> {
    SERVICES
        .get_or_try_init(|| async { Services::build(config).await.map(Arc::new) })
        .await
        .cloned()
}
