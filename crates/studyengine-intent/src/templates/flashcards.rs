//! Flashcards: no cleanup step, NotebookLM handles the raw content.

use super::{EXPORT_FROM_NOTION, LOCATE_FILES, SHARE_DESCRIPTION, generate_step, paste_link, share_step, upload_step};
use crate::types::{TemplateStep, WorkflowTemplate, WorkflowType};

const STEPS: &[TemplateStep] = &[
    EXPORT_FROM_NOTION,
    LOCATE_FILES,
    upload_step!(3, "Flashcards"),
    generate_step!(
        4,
        "Generate flashcards in NotebookLM",
        "AccomplishAI will use NotebookLM's Study Guide feature to generate flashcards.",
        "Flashcards",
        "button or the \"Study Guide\" section. Click on it to open the study tools panel. \
         Find and click the \"Flashcards\" option to generate flashcards from the uploaded sources.",
        "Wait for the generation to complete — this may take 15-30 seconds depending on the amount of content."
    ),
    share_step!(5, "Flashcards", SHARE_DESCRIPTION),
    paste_link(6),
];

pub const FLASHCARDS: WorkflowTemplate = WorkflowTemplate {
    workflow_type: WorkflowType::Flashcards,
    title: "Generate Flashcards for {topic}",
    description: "Export your {topic} notes from {source}, upload to NotebookLM, and generate flashcards for study.",
    estimated_time: "10-15 min",
    steps: STEPS,
};
