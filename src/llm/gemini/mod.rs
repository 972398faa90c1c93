//! Google Gemini provider using JSON-mode `generateContent`.
//!
//! Every call sends the flow's response schema with
//! `responseMimeType = application/json` and the caller's safety settings.

use crate::config::LlmConfig;
use crate::error::LlmError;
use crate::llm::{
    build_provider_client_with_timeout, sanitize_api_error,
    structured::StructuredRequest,
    traits::{Provider, ProviderFuture},
};
use reqwest::{Client, StatusCode};

mod types;
use types::{
    Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig, Part,
};

const PROVIDER: &str = "gemini";

/// Finish reasons that mean the candidate was withheld.
const BLOCKING_FINISH_REASONS: [&str; 4] = ["SAFETY", "PROHIBITED_CONTENT", "BLOCKLIST", "SPII"];
const MAX_TOKENS_FINISH_REASON: &str = "MAX_TOKENS";

pub struct GeminiProvider {
    api_key: Option<String>,
    base_url: String,
    max_output_tokens: u32,
    client: Client,
}

impl GeminiProvider {
    pub fn new(
        api_key: Option<&str>,
        base_url: &str,
        timeout_secs: u64,
        max_output_tokens: u32,
    ) -> Self {
        Self {
            api_key: api_key
                .map(str::trim)
                .filter(|k| !k.is_empty())
                .map(String::from),
            base_url: base_url.trim_end_matches('/').to_string(),
            max_output_tokens,
            client: build_provider_client_with_timeout(timeout_secs),
        }
    }

    pub fn from_config(api_key: Option<&str>, llm: &LlmConfig) -> Self {
        Self::new(
            api_key,
            &llm.base_url,
            llm.timeout_secs,
            llm.max_output_tokens,
        )
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    fn model_name(model: &str) -> String {
        if model.starts_with("models/") {
            model.to_string()
        } else {
            format!("models/{model}")
        }
    }

    fn endpoint(&self, model: &str) -> String {
        format!(
            "{}/{}:generateContent",
            self.base_url,
            Self::model_name(model)
        )
    }

    fn build_request(request: &StructuredRequest<'_>, max_output_tokens: u32) -> GenerateContentRequest {
        GenerateContentRequest {
            contents: vec![Content {
                role: "user".to_string(),
                parts: vec![Part {
                    text: request.prompt.to_string(),
                }],
            }],
            safety_settings: request.safety_settings.to_vec(),
            generation_config: GenerationConfig {
                temperature: request.temperature,
                max_output_tokens,
                response_mime_type: "application/json",
                response_schema: request.response_schema.clone(),
            },
        }
    }

    fn request_error(message: impl Into<String>) -> LlmError {
        LlmError::Request {
            provider: PROVIDER.to_string(),
            message: message.into(),
        }
    }

    fn status_error(status: StatusCode, retry_after_secs: Option<u64>, body: &str) -> LlmError {
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => LlmError::Auth {
                provider: PROVIDER.to_string(),
            },
            StatusCode::TOO_MANY_REQUESTS => LlmError::RateLimited {
                provider: PROVIDER.to_string(),
                retry_after_secs: retry_after_secs.unwrap_or(0),
            },
            _ => Self::request_error(format!(
                "Gemini API error ({status}): {}",
                sanitize_api_error(body)
            )),
        }
    }

    async fn call_api(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, LlmError> {
        let api_key = self.api_key.as_deref().ok_or_else(|| LlmError::MissingApiKey {
            provider: PROVIDER.to_string(),
        })?;

        let response = self
            .client
            .post(self.endpoint(model))
            .header("x-goog-api-key", api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| Self::request_error(sanitize_api_error(&e.to_string())))?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse::<u64>().ok());
            let body = response.text().await.unwrap_or_default();
            return Err(Self::status_error(status, retry_after, &body));
        }

        let result: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| Self::request_error(format!("invalid response body: {e}")))?;

        if let Some(err) = result.error.as_ref() {
            return Err(Self::request_error(sanitize_api_error(&err.message)));
        }

        Ok(result)
    }

    fn extract_text(
        result: &GenerateContentResponse,
        max_output_tokens: u32,
    ) -> Result<String, LlmError> {
        if let Some(reason) = result
            .prompt_feedback
            .as_ref()
            .and_then(|f| f.block_reason.as_deref())
        {
            return Err(LlmError::Blocked {
                provider: PROVIDER.to_string(),
                reason: reason.to_string(),
            });
        }

        let candidate = result
            .candidates
            .as_ref()
            .and_then(|c| c.first())
            .ok_or_else(|| LlmError::EmptyResponse {
                provider: PROVIDER.to_string(),
            })?;

        let text = candidate
            .content
            .as_ref()
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter_map(|part| part.text.as_deref())
                    .collect::<String>()
            })
            .unwrap_or_default();

        if text.is_empty()
            && let Some(reason) = candidate.finish_reason.as_deref()
            && BLOCKING_FINISH_REASONS.contains(&reason)
        {
            return Err(LlmError::Blocked {
                provider: PROVIDER.to_string(),
                reason: reason.to_string(),
            });
        }

        // Thinking tokens count against the limit and can leave no answer.
        if text.is_empty() && candidate.finish_reason.as_deref() == Some(MAX_TOKENS_FINISH_REASON) {
            return Err(LlmError::OutputTruncated {
                provider: PROVIDER.to_string(),
                max_output_tokens,
            });
        }

        Ok(text)
    }
}

impl Provider for GeminiProvider {
    fn name(&self) -> &str {
        PROVIDER
    }

    fn generate_structured<'a>(
        &'a self,
        request: StructuredRequest<'a>,
    ) -> ProviderFuture<'a, String> {
        Box::pin(async move {
            let body = Self::build_request(&request, self.max_output_tokens);
            let result = self.call_api(request.model, &body).await?;
            if let Some(usage) = result.usage_metadata.as_ref() {
                tracing::debug!(
                    flow = request.flow,
                    model = result.model_version.as_deref().unwrap_or(request.model),
                    prompt_tokens = usage.prompt_token_count,
                    output_tokens = usage.candidates_token_count,
                    "gemini call complete"
                );
            }
            Self::extract_text(&result, self.max_output_tokens)
        })
    }

    fn warmup(&self) -> ProviderFuture<'_, ()> {
        Box::pin(async move {
            // Any response, even 404, means the connection pool is primed.
            self.client
                .get(&self.base_url)
                .send()
                .await
                .map_err(|e| Self::request_error(sanitize_api_error(&e.to_string())))?;
            Ok(())
        })
    }
}
