//! Organize scattered notes into one notebook and map them.
//!
//! Gathering is broader here: every related page or file is collected,
//! not a single document.

use super::{LOCAL_ONLY, NOTION_ONLY, cleanup_step, generate_step, paste_link, share_step, upload_step};
use crate::types::{StepType, TemplateStep, WorkflowTemplate, WorkflowType};

const STEPS: &[TemplateStep] = &[
    TemplateStep {
        id: 1,
        name: "Export notes from Notion",
        description: "AccomplishAI will export your {topic} notes from Notion as PDF files.",
        step_type: StepType::Accomplish,
        instruction: "Open notion.so in the browser. In the left sidebar, navigate to the workspace and find ALL pages and subpages related to \"{topic}\". \
            This may include lecture notes, assignments, readings, and project pages spread across different sections. \
            For each relevant page, click the \"...\" (three-dot menu) in the top-right corner, select \"Export\", \
            set Format to \"PDF\", enable \"Include subpages\" if available, and click \"Export\". \
            Repeat for all relevant pages. All files will be saved to ~/Downloads.",
        optional: false,
        source_filter: Some(NOTION_ONLY),
    },
    TemplateStep {
        id: 2,
        name: "Locate your files",
        description: "AccomplishAI will find all your {topic} files in your {source} folder.",
        step_type: StepType::Accomplish,
        instruction: "Open Finder. Navigate to the {source} folder. Search for all files related to \"{topic}\" — these may be PDFs, \
            Word documents (.docx), text files, or images of handwritten notes. Check subfolders too. \
            Select all relevant files (Cmd+A or Cmd+Click). Keep this Finder window open — you will upload these files in the next step.",
        optional: false,
        source_filter: Some(LOCAL_ONLY),
    },
    cleanup_step!(
        3,
        "Use AI to clean and consolidate your raw notes before uploading. Helpful if notes are messy or duplicated.",
        "removing duplicates, fixing formatting, and organizing the content by topic or chapter."
    ),
    upload_step!(
        4,
        "Organized",
        "AccomplishAI will open Google NotebookLM and upload all your collected files.",
        "ALL the"
    ),
    generate_step!(
        5,
        "Generate mind map in NotebookLM",
        "AccomplishAI will generate a mind map to visualize how your notes connect.",
        "Organized",
        "button or the study tools panel. Click on it to open the study tools. \
         Find and click the \"Mind Map\" option to generate a visual overview showing how all topics and subtopics connect.",
        "Wait for the generation to complete — this may take 15-30 seconds depending on the amount of content."
    ),
    share_step!(
        6,
        "Organized",
        "AccomplishAI will get the shareable link for your organized notebook."
    ),
    paste_link(7),
];

pub const ORGANIZE: WorkflowTemplate = WorkflowTemplate {
    workflow_type: WorkflowType::Organize,
    title: "Organize Notes for {topic}",
    description: "Collect your scattered {topic} notes from {source}, upload to NotebookLM, and generate a mind map to visualize the structure.",
    estimated_time: "10-15 min",
    steps: STEPS,
};
