use super::structured::StructuredRequest;
use crate::error::LlmError;
use std::future::Future;
use std::pin::Pin;

pub type ProviderFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, LlmError>> + Send + 'a>>;

/// A hosted model that answers a prompt with JSON constrained by a schema.
///
/// Implementations return the raw JSON text; callers own the decoding so a
/// shape mismatch is reported against the flow that asked for it.
pub trait Provider: Send + Sync {
    /// Provider identifier (e.g. "gemini").
    fn name(&self) -> &str;

    fn generate_structured<'a>(&'a self, request: StructuredRequest<'a>)
    -> ProviderFuture<'a, String>;

    /// Warm up the HTTP connection pool.
    fn warmup(&self) -> ProviderFuture<'_, ()> {
        Box::pin(async move { Ok(()) })
    }
}
