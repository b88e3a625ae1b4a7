//! Process-wide, lazily constructed LLM client handle.
//!
//! The client is built on first use rather than at startup so that requests
//! resolved by the rule classifier never need an API key.  A failed
//! construction is returned to the caller and not cached; the next call tries
//! again.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::backend::CompletionBackend;
use crate::client::{API_KEY_ENV, LlmClient, LlmClientConfig};
use crate::error::Result;
use crate::types::{ChatRequest, LlmResponse};

/// Supplies the API key at construction time.
type KeySource = Box<dyn Fn() -> Option<String> + Send + Sync>;

/// A write-once, read-many handle to an [`LlmClient`].
pub struct SharedLlm {
    base: LlmClientConfig,
    key_source: KeySource,
    handle: Mutex<Option<Arc<LlmClient>>>,
}

impl SharedLlm {
    /// Create a handle that reads the key from `OPENAI_API_KEY` when `base`
    /// carries none.
    pub fn new(base: LlmClientConfig) -> Self {
        Self::with_key_source(base, || std::env::var(API_KEY_ENV).ok())
    }

    /// Create a handle with a custom key source.
    ///
    /// The source is consulted only while no client has been built and
    /// `base.api_key` is empty.
    pub fn with_key_source(
        base: LlmClientConfig,
        key_source: impl Fn() -> Option<String> + Send + Sync + 'static,
    ) -> Self {
        Self {
            base,
            key_source: Box::new(key_source),
            handle: Mutex::new(None),
        }
    }

    /// Return the shared client, constructing it on first call.
    pub async fn client(&self) -> Result<Arc<LlmClient>> {
        let mut guard = self.handle.lock().await;
        if let Some(client) = guard.as_ref() {
            return Ok(Arc::clone(client));
        }

        let mut config = self.base.clone();
        if config.api_key.is_empty() {
            config.api_key = (self.key_source)().unwrap_or_default();
        }

        debug!(base_url = %config.base_url, "constructing LLM client");
        let client = Arc::new(LlmClient::new(config)?);
        *guard = Some(Arc::clone(&client));
        info!(model = client.default_model(), "LLM client initialized");
        Ok(client)
    }

    /// Whether a client has been constructed yet.
    pub async fn is_initialized(&self) -> bool {
        self.handle.lock().await.is_some()
    }
}

impl std::fmt::Debug for SharedLlm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedLlm")
            .field("base_url", &self.base.base_url)
            .field("default_model", &self.base.default_model)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl CompletionBackend for SharedLlm {
    async fn complete(&self, request: &ChatRequest) -> Result<LlmResponse> {
        let client = self.client().await?;
        client.chat(request).await
    }
}
