use std::fmt;
use thiserror::Error;

// ─── Top-level error hierarchy ───────────────────────────────────────────────

/// Structured error hierarchy for `MentalCare`.
///
/// Each pipeline seam reports its own variant so callers can pick the
/// user-facing message and HTTP status. Bootstrap code (config loading, CLI
/// dispatch) keeps using `anyhow::Result` for context chains.
#[derive(Debug, Error)]
pub enum CareError {
    // ── Input ────────────────────────────────────────────────────────────
    #[error(transparent)]
    Validation(#[from] ValidationError),

    // ── Model output did not match the expected schema ──────────────────
    #[error("malformed model output from {flow}: {message}")]
    MalformedModelOutput { flow: &'static str, message: String },

    // ── Store ───────────────────────────────────────────────────────────
    #[error("persistence: {0}")]
    Persistence(#[from] StoreError),

    // ── LLM / Provider ──────────────────────────────────────────────────
    #[error("external service: {0}")]
    ExternalService(#[from] LlmError),

    // ── Prompt / Template ───────────────────────────────────────────────
    #[error("prompt: {0}")]
    Prompt(#[from] PromptError),

    // ── Config ──────────────────────────────────────────────────────────
    #[error("config: {0}")]
    Config(#[from] ConfigError),

    // ── Generic fallthrough (wraps anyhow for interop) ──────────────────
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CareError {
    pub fn malformed(flow: &'static str, message: impl Into<String>) -> Self {
        Self::MalformedModelOutput {
            flow,
            message: message.into(),
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// True for failures caused by the hosted model (transport or output shape).
    pub fn is_model_failure(&self) -> bool {
        matches!(
            self,
            Self::ExternalService(_) | Self::MalformedModelOutput { .. }
        )
    }
}

// ─── Validation errors ───────────────────────────────────────────────────────

/// One rejected form field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub reason: String,
}

impl FieldError {
    pub fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.reason)
    }
}

/// Every offending field of a rejected form, in field order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub fields: Vec<FieldError>,
}

impl ValidationError {
    pub fn single(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            fields: vec![FieldError::new(field, reason)],
        }
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.fields.iter().any(|f| f.field == field)
    }

    /// Field-level message shown to the end user.
    pub fn user_message(&self) -> String {
        format!("Invalid input: {}.", self.joined())
    }

    fn joined(&self) -> String {
        self.fields
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ")
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid input: {}", self.joined())
    }
}

impl std::error::Error for ValidationError {}

// ─── LLM / Provider errors ──────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("provider {provider} request failed: {message}")]
    Request { provider: String, message: String },

    #[error("provider {provider} rate-limited (retry after {retry_after_secs}s)")]
    RateLimited {
        provider: String,
        retry_after_secs: u64,
    },

    #[error("provider {provider} authentication failed")]
    Auth { provider: String },

    #[error("provider {provider} has no API key configured")]
    MissingApiKey { provider: String },

    #[error("provider {provider} blocked the prompt: {reason}")]
    Blocked { provider: String, reason: String },

    #[error("provider {provider} returned no candidates")]
    EmptyResponse { provider: String },

    #[error("provider {provider} hit the output token limit ({max_output_tokens}) before answering")]
    OutputTruncated {
        provider: String,
        max_output_tokens: u32,
    },
}

// ─── Store errors ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("open failed: {0}")]
    Open(String),

    #[error("schema migration failed: {0}")]
    Migration(String),

    #[error("write failed: {0}")]
    Write(String),

    #[error("delete failed: {0}")]
    Delete(String),

    #[error("query failed: {0}")]
    Query(String),

    #[error("corrupt row: {0}")]
    Decode(String),
}

// ─── Prompt / Template errors ───────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum PromptError {
    #[error("template render failed: {0}")]
    Render(String),

    #[error("template not found: {0}")]
    NotFound(String),
}

// ─── Config errors ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load config: {0}")]
    Load(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

// ─── Convenience re-exports ─────────────────────────────────────────────────

/// Shorthand result type for the crate.
pub type Result<T> = std::result::Result<T, CareError>;
