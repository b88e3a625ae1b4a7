//! Intent resolution and workflow population for StudyEngine.
//!
//! This crate turns a free-text study request into a populated, human
//! executable checklist:
//!
//! ```text
//! prompt + context
//!        │
//!        ▼
//! ┌───────────────┐  miss  ┌──────────────────┐
//! │ RuleClassifier│──────> │ LlmIntentParser  │
//! │  (fast path)  │        │ (function call)  │
//! └──────┬────────┘        └────────┬─────────┘
//!        │ hit                      │ threshold gate
//!        └──────────┬───────────────┘
//!                   ▼
//!            IntentResolver ──> templates::template_for ──> populate_workflow
//! ```
//!
//! ## Modules
//!
//! - [`rules`] -- Ordered regex rules with a study-context gate.
//! - [`inference`] -- Source and topic inference from prompt and context.
//! - [`parser`] -- LLM function-call fallback with enum validation.
//! - [`resolver`] -- Orchestration and the confidence gate.
//! - [`templates`] -- The six static workflow templates.
//! - [`populate`] -- Filtering, placeholder substitution, renumbering.
//! - [`bridge`] -- Step execution view-model.
//! - [`processor`] -- LLM notes cleanup and revision scheduling.

pub mod bridge;
pub mod error;
pub mod inference;
pub mod parser;
pub mod populate;
pub mod processor;
pub mod resolver;
pub mod rules;
pub mod templates;
pub mod types;

pub use bridge::{StepAction, StepExecution, execute_step};
pub use error::{IntentError, Result};
pub use parser::{LlmIntent, LlmIntentParser, LlmWorkflowType};
pub use populate::populate_workflow;
pub use templates::{available_workflows, template_for};
pub use processor::{
    Difficulty, NotesProcessor, ProcessKind, RevisionEvent, RevisionPlan, SessionType,
    parse_revision_plan,
};
pub use resolver::{DEFAULT_CONFIDENCE_THRESHOLD, IntentResolver, Resolution, WorkflowPlan};
pub use rules::{RuleClassifier, RuleMatch, RuleSpec};
pub use types::{
    ContextItem, ContextPayload, ContextSource, IconType, ParsedIntent, PopulatedStep, PopulatedWorkflow,
    ResolutionTier, SourceType, StepStatus, StepType, TemplateStep, WorkflowTemplate, WorkflowType,
};
