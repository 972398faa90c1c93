use crate::error::CareError;
use crate::llm::{CRISIS_SAFETY_SETTINGS, Provider, StructuredRequest, parse_structured};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;

/// A provider bound to one model and temperature.
#[derive(Clone)]
pub(crate) struct ModelFlow {
    provider: Arc<dyn Provider>,
    model: String,
    temperature: f64,
}

impl ModelFlow {
    pub(crate) fn new(provider: Arc<dyn Provider>, model: &str, temperature: f64) -> Self {
        Self {
            provider,
            model: model.to_string(),
            temperature,
        }
    }

    /// Send `prompt` under `schema` and decode the answer into `T`.
    pub(crate) async fn call<T: DeserializeOwned>(
        &self,
        flow: &'static str,
        prompt: &str,
        schema: &Value,
    ) -> Result<T, CareError> {
        let request = StructuredRequest {
            flow,
            prompt,
            response_schema: schema,
            model: &self.model,
            temperature: self.temperature,
            safety_settings: &CRISIS_SAFETY_SETTINGS,
        };
        let raw = self.provider.generate_structured(request).await?;
        parse_structured(flow, &raw)
    }
}
