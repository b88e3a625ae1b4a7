//! LLM error types.
//!
//! All LLM operations surface errors through [`LlmError`].

/// Unified error type for the LLM layer.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    /// An HTTP request to the LLM provider failed.
    #[error("llm request failed: {reason}")]
    RequestFailed { reason: String },

    /// The provider answered with a non-success status code.
    #[error("llm api returned {status}: {body}")]
    ApiStatus { status: u16, body: String },

    /// The LLM response could not be parsed into the expected format.
    #[error("llm response parse error: {reason}")]
    ParseFailed { reason: String },

    /// The API key is missing for the configured provider.
    #[error("missing api key: set {env_var} to enable the LLM fallback")]
    MissingApiKey { env_var: &'static str },

    /// JSON serialization or deserialization failed.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience alias used throughout the LLM crate.
pub type Result<T> = std::result::Result<T, LlmError>;

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        Self::RequestFailed {
            reason: err.to_string(),
        }
    }
}
