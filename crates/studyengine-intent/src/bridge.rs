//! Step execution bridge.
//!
//! Maps a populated step to what the frontend should do with it.  Nothing
//! is executed here; the human carries out the instruction.

use serde::{Deserialize, Serialize};

use crate::types::{ParsedIntent, PopulatedStep, StepType};

/// Frontend action for a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepAction {
    CopyToClipboard,
    ShowLinkInput,
}

/// Execution view of a single step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepExecution {
    pub instruction: String,
    pub action: StepAction,
    pub step_id: u32,
    pub step_name: String,
}

/// Build the execution view for `step`.
pub fn execute_step(step: &PopulatedStep, _intent: &ParsedIntent) -> StepExecution {
    let action = match step.step_type {
        StepType::LinkInput => StepAction::ShowLinkInput,
        StepType::Accomplish | StepType::LlmProcess => StepAction::CopyToClipboard,
    };
    StepExecution {
        instruction: step.instruction.clone(),
        action,
        step_id: step.id,
        step_name: step.name.clone(),
    }
}
