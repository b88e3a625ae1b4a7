//! The completion trait seam.
//!
//! The intent pipeline depends on [`CompletionBackend`] rather than on a
//! concrete HTTP client.  [`crate::LlmClient`] and [`crate::SharedLlm`]
//! implement it for production; tests script it.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{ChatRequest, LlmResponse};

/// A single opaque chat completion call.
///
/// Retries, rate limiting, and model selection are the implementor's
/// concern.  Callers treat a returned error as final.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Send `request` and return the model's response.
    async fn complete(&self, request: &ChatRequest) -> Result<LlmResponse>;
}
