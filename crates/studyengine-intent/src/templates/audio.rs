//! Podcast-style audio overview.

use super::{
    DEFAULT_CLEANUP_DESCRIPTION, EXPORT_FROM_NOTION, LOCATE_FILES, cleanup_step, generate_step,
    paste_link, share_step, upload_step,
};
use crate::types::{TemplateStep, WorkflowTemplate, WorkflowType};

const STEPS: &[TemplateStep] = &[
    EXPORT_FROM_NOTION,
    LOCATE_FILES,
    cleanup_step!(
        3,
        DEFAULT_CLEANUP_DESCRIPTION,
        "fixing formatting, removing duplicates, and organizing the content for a better audio overview."
    ),
    upload_step!(4, "Audio Overview"),
    generate_step!(
        5,
        "Generate audio overview in NotebookLM",
        "AccomplishAI will use NotebookLM's Audio Overview to create a podcast-style discussion of your notes.",
        "Audio Overview",
        "button or the study tools panel. Click on it to open the study tools. \
         Find and click the \"Audio Overview\" option. NotebookLM will generate a podcast-style conversation between two AI hosts \
         discussing your study material.",
        "This takes 2-5 minutes to generate — wait for the audio player to appear. \
         Once ready, you can play it directly or download it."
    ),
    share_step!(
        6,
        "Audio Overview",
        "AccomplishAI will get the shareable link for your NotebookLM notebook with the audio overview."
    ),
    paste_link(7),
];

pub const AUDIO: WorkflowTemplate = WorkflowTemplate {
    workflow_type: WorkflowType::Audio,
    title: "Generate Audio Overview for {topic}",
    description: "Export your {topic} notes from {source}, upload to NotebookLM, and generate a podcast-style audio overview.",
    estimated_time: "12-18 min",
    steps: STEPS,
};
