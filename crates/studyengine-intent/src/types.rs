//! Shared data shapes of the intent pipeline.
//!
//! JSON field names follow the frontend contract (`workflowType`,
//! `sourceType`, `estimatedTime`), so every serialized struct here uses
//! `rename_all = "camelCase"`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::IntentError;

// ---------------------------------------------------------------------------
// Enumerations
// ---------------------------------------------------------------------------

/// What kind of study workflow the user wants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkflowType {
    Flashcards,
    Quiz,
    Summary,
    Organize,
    Audio,
    Revision,
}

impl WorkflowType {
    /// Every workflow type, in registry order.
    pub const ALL: [WorkflowType; 6] = [
        Self::Flashcards,
        Self::Quiz,
        Self::Summary,
        Self::Organize,
        Self::Audio,
        Self::Revision,
    ];

    /// The wire name of this workflow type.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Flashcards => "flashcards",
            Self::Quiz => "quiz",
            Self::Summary => "summary",
            Self::Organize => "organize",
            Self::Audio => "audio",
            Self::Revision => "revision",
        }
    }
}

impl fmt::Display for WorkflowType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WorkflowType {
    type Err = IntentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| IntentError::UnknownWorkflowType {
                value: s.to_owned(),
            })
    }
}

/// Where the user's study material lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    Notion,
    LocalFiles,
    Downloads,
}

impl SourceType {
    /// Every source type.
    pub const ALL: [SourceType; 3] = [Self::Notion, Self::LocalFiles, Self::Downloads];

    /// The wire name of this source type.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Notion => "notion",
            Self::LocalFiles => "local_files",
            Self::Downloads => "downloads",
        }
    }
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceType {
    type Err = IntentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| IntentError::UnknownSourceType {
                value: s.to_owned(),
            })
    }
}

/// How a step is carried out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepType {
    /// The user copies an instruction into the browser agent.
    Accomplish,
    /// The user pastes a link back (e.g. a NotebookLM share link).
    LinkInput,
    /// Optional LLM cleanup the user may skip.
    LlmProcess,
}

/// Status of a single populated step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    Pending,
    Active,
    Completed,
    Failed,
}

/// Which tier of the resolver produced an intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionTier {
    /// Matched by the regex rule classifier.
    Rules,
    /// Parsed by the LLM fallback.
    Llm,
}

// ---------------------------------------------------------------------------
// Intent
// ---------------------------------------------------------------------------

/// A structured study intent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedIntent {
    /// Which workflow template to use.
    pub workflow_type: WorkflowType,
    /// Human-readable source label (e.g. "Notion", "Downloads folder").
    pub source: String,
    /// Normalized source type, drives step filtering.
    pub source_type: SourceType,
    /// Free-text subject of the request.
    pub topic: String,
    /// Classification confidence in `0.0..=1.0`.
    pub confidence: f64,
}

// ---------------------------------------------------------------------------
// Drag-drop context
// ---------------------------------------------------------------------------

/// Where a dragged context item came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContextSource {
    Notion,
    Local,
}

/// How a context item's icon is encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IconType {
    Emoji,
    External,
}

/// An item the user dragged into the composer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextItem {
    pub id: String,
    pub title: String,
    pub source: ContextSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_type: Option<IconType>,
}

impl ContextItem {
    /// Convenience constructor without an icon.
    pub fn new(id: impl Into<String>, title: impl Into<String>, source: ContextSource) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            source,
            icon: None,
            icon_type: None,
        }
    }
}

/// The ordered set of dragged items sent alongside a prompt.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContextPayload {
    /// Optional source hint from the frontend.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Dragged items, in drop order.
    #[serde(default)]
    pub items: Vec<ContextItem>,
}

impl ContextPayload {
    /// Build a payload from items.
    pub fn from_items(items: Vec<ContextItem>) -> Self {
        Self {
            source: None,
            items,
        }
    }
}

// ---------------------------------------------------------------------------
// Templates
// ---------------------------------------------------------------------------

/// A step in a static workflow template.
///
/// Text fields may contain `{topic}`, `{source}` and `{sourceType}`.
#[derive(Debug, Clone, Copy)]
pub struct TemplateStep {
    pub id: u32,
    pub name: &'static str,
    pub description: &'static str,
    pub step_type: StepType,
    pub instruction: &'static str,
    pub optional: bool,
    /// `None` means the step applies to every source.
    pub source_filter: Option<&'static [SourceType]>,
}

impl TemplateStep {
    /// Whether this step survives filtering for `source_type`.
    pub fn applies_to(&self, source_type: SourceType) -> bool {
        self.source_filter
            .is_none_or(|allowed| allowed.contains(&source_type))
    }
}

/// A static, parametrized workflow definition.
#[derive(Debug, Clone, Copy)]
pub struct WorkflowTemplate {
    pub workflow_type: WorkflowType,
    pub title: &'static str,
    pub description: &'static str,
    pub estimated_time: &'static str,
    pub steps: &'static [TemplateStep],
}

// ---------------------------------------------------------------------------
// Populated workflow
// ---------------------------------------------------------------------------

/// A step after population: placeholders filled, id renumbered, status
/// seeded.  Carries no source filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PopulatedStep {
    pub id: u32,
    pub name: String,
    pub description: String,
    #[serde(rename = "type")]
    pub step_type: StepType,
    pub instruction: String,
    pub status: StepStatus,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub optional: bool,
}

/// A workflow ready for persistence and display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PopulatedWorkflow {
    #[serde(rename = "type")]
    pub workflow_type: WorkflowType,
    pub title: String,
    pub description: String,
    pub estimated_time: String,
    pub steps: Vec<PopulatedStep>,
}

impl PopulatedWorkflow {
    /// Look up a step by its renumbered id.
    pub fn step(&self, id: u32) -> Option<&PopulatedStep> {
        self.steps.iter().find(|s| s.id == id)
    }
}
