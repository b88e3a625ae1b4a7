//! LLM integration layer for StudyEngine.
//!
//! StudyEngine only talks to a model in two places: the intent parser's
//! function-call fallback and the notes processor.  Both go through the
//! [`CompletionBackend`] trait so the pipeline can be exercised without a
//! network.
//!
//! ## Modules
//!
//! - [`types`] -- Provider-agnostic messages, tool definitions, responses.
//! - [`client`] -- HTTP client for the OpenAI Chat Completions API.
//! - [`backend`] -- The completion trait seam.
//! - [`shared`] -- Process-wide, lazily constructed client handle.
//! - [`error`] -- LLM error types.

pub mod backend;
pub mod client;
pub mod error;
pub mod shared;
pub mod types;

pub use backend::CompletionBackend;
pub use client::{LlmClient, LlmClientConfig};
pub use error::{LlmError, Result};
pub use shared::SharedLlm;
pub use types::{ChatRequest, LlmResponse, Message, Role, ToolCall, ToolDefinition};
