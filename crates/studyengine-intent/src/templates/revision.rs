//! Revision planning.
//!
//! The only template with two LLM steps: optional cleanup, then the
//! spaced-repetition schedule that feeds the calendar step.

use super::{
    DEFAULT_CLEANUP_DESCRIPTION, EXPORT_FROM_NOTION, LOCATE_FILES, cleanup_step, generate_step,
    paste_link, share_step, upload_step,
};
use crate::types::{StepType, TemplateStep, WorkflowTemplate, WorkflowType};

const STEPS: &[TemplateStep] = &[
    EXPORT_FROM_NOTION,
    LOCATE_FILES,
    cleanup_step!(
        3,
        DEFAULT_CLEANUP_DESCRIPTION,
        "fixing formatting, removing duplicates, and organizing the content before analysis."
    ),
    upload_step!(4, "Revision"),
    generate_step!(
        5,
        "Generate study guide in NotebookLM",
        "AccomplishAI will generate a study guide so you have a reference while revising.",
        "Revision",
        "button or the study tools panel. Click on it to open the study tools. \
         Find and click the \"Study Guide\" option to generate a comprehensive study guide.",
        "Wait for the generation to complete. This study guide will be your reference material during revision sessions."
    ),
    TemplateStep {
        id: 6,
        name: "Generate revision schedule",
        description: "AI will analyze your study material and create a spaced-repetition revision schedule tailored to the content.",
        step_type: StepType::LlmProcess,
        instruction: "Paste a summary or table of contents of your {topic} material here (you can copy from the study guide). \
            Include your exam date if you have one. \
            AI will analyze the topics and generate a smart revision schedule using spaced repetition principles — \
            harder or larger topics get more sessions, and reviews are spaced out for optimal retention.",
        optional: false,
        source_filter: None,
    },
    TemplateStep {
        id: 7,
        name: "Create revision events on Google Calendar",
        description: "AccomplishAI will add the revision schedule as events on your Google Calendar.",
        step_type: StepType::Accomplish,
        instruction: "Open Google Calendar at calendar.google.com in the browser. \
            For each study session in the revision schedule below, create a new event: \
            click the \"+\" or click on the target date, enter the session title (e.g. \"{topic} — Chapter 3 Review\"), \
            set the start and end time as specified, and save. Repeat for all sessions. \
            The revision schedule with specific dates, times, and topics will be provided from the previous step.",
        optional: false,
        source_filter: None,
    },
    share_step!(
        8,
        "Revision",
        "AccomplishAI will get the shareable link for your NotebookLM revision notebook."
    ),
    paste_link(9),
];

pub const REVISION: WorkflowTemplate = WorkflowTemplate {
    workflow_type: WorkflowType::Revision,
    title: "Create Revision Plan for {topic}",
    description: "Export your {topic} notes from {source}, generate a study guide, then create a smart revision schedule on Google Calendar.",
    estimated_time: "15-25 min",
    steps: STEPS,
};
