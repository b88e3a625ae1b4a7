//! Practice quiz.

use super::{
    DEFAULT_CLEANUP_DESCRIPTION, EXPORT_FROM_NOTION, LOCATE_FILES, SHARE_DESCRIPTION, cleanup_step,
    generate_step, paste_link, share_step, upload_step,
};
use crate::types::{TemplateStep, WorkflowTemplate, WorkflowType};

const STEPS: &[TemplateStep] = &[
    EXPORT_FROM_NOTION,
    LOCATE_FILES,
    cleanup_step!(
        3,
        DEFAULT_CLEANUP_DESCRIPTION,
        "fixing formatting, removing duplicates, and organizing the content for better quiz generation."
    ),
    upload_step!(4, "Quiz"),
    generate_step!(
        5,
        "Generate quiz in NotebookLM",
        "AccomplishAI will use NotebookLM's Notebook Guide to generate a practice quiz.",
        "Quiz",
        "button or the study tools panel. Click on it to open the study tools. \
         Find and click the \"Quiz\" option to generate a practice quiz from the uploaded sources.",
        "Wait for the generation to complete — this may take 15-30 seconds depending on the amount of content."
    ),
    share_step!(6, "Quiz", SHARE_DESCRIPTION),
    paste_link(7),
];

pub const QUIZ: WorkflowTemplate = WorkflowTemplate {
    workflow_type: WorkflowType::Quiz,
    title: "Generate Quiz for {topic}",
    description: "Export your {topic} notes from {source}, upload to NotebookLM, and generate a practice quiz.",
    estimated_time: "10-15 min",
    steps: STEPS,
};
