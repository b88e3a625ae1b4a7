//! Intent pipeline error types.
//!
//! Only two states are translated into a user-facing message (no match and
//! low confidence, both [`IntentError::Rejected`]).  Everything else keeps
//! its original detail for the caller to log or report.

use studyengine_llm::LlmError;

use crate::types::{SourceType, WorkflowType};

/// Message returned when no actionable study workflow can be identified.
pub const REJECTION_MESSAGE: &str = "I couldn't identify a study workflow from your request. \
     Try something like \"generate flashcards for OS\" or \"summarize my DBMS notes\".";

/// Unified error type for the intent pipeline.
#[derive(Debug, thiserror::Error)]
pub enum IntentError {
    // -- Input errors ----------------------------------------------------------
    /// The prompt was empty or whitespace only.
    #[error("prompt is empty")]
    EmptyPrompt,

    /// Notes content passed to the processor was empty.
    #[error("notes content is empty")]
    EmptyContent,

    // -- Resolution errors -----------------------------------------------------
    /// Neither the rules nor the LLM produced an actionable intent.
    #[error("{}", REJECTION_MESSAGE)]
    Rejected,

    /// A string did not name a known workflow type.
    #[error("unknown workflow type `{value}`")]
    UnknownWorkflowType { value: String },

    /// A string did not name a known source type.
    #[error("unknown source type `{value}`")]
    UnknownSourceType { value: String },

    /// A string did not name a known notes processing kind.
    #[error("invalid processing type `{value}`. Must be one of: {valid}")]
    UnknownProcessKind { value: String, valid: String },

    // -- Schema violations from the LLM ----------------------------------------
    /// The LLM did not return the expected function call.
    #[error("LLM did not return the expected `{function}` function call")]
    MissingFunctionCall { function: &'static str },

    /// The function call arguments were not valid JSON.
    #[error("received malformed JSON from function call: {reason}")]
    MalformedArguments { reason: String },

    /// The LLM returned a workflow type outside the declared enum.
    #[error("LLM returned invalid workflow type {value}. Valid types: {valid}")]
    InvalidWorkflowType { value: String, valid: String },

    /// The LLM returned a source type outside the declared enum.
    #[error("LLM returned invalid source type {value}. Valid types: {valid}")]
    InvalidSourceType { value: String, valid: String },

    /// The LLM returned no text for a text completion.
    #[error("LLM returned an empty response")]
    EmptyCompletion,

    /// A revision plan returned by the LLM could not be decoded.
    #[error("invalid revision plan: {reason}")]
    InvalidRevisionPlan { reason: String },

    // -- Population errors -----------------------------------------------------
    /// Source filtering removed every step of the template.
    #[error("workflow `{workflow_type}` has no steps for source `{source_type}`")]
    EmptyWorkflow {
        workflow_type: WorkflowType,
        source_type: SourceType,
    },

    // -- Configuration ---------------------------------------------------------
    /// A classifier rule pattern failed to compile.
    #[error("invalid rule pattern `{pattern}`: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    // -- Upstream --------------------------------------------------------------
    /// An error propagated from the LLM layer (network, auth, API status).
    #[error("llm error: {0}")]
    Llm(#[from] LlmError),
}

/// Convenience alias used throughout the intent crate.
pub type Result<T> = std::result::Result<T, IntentError>;
