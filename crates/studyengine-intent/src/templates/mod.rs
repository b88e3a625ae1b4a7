//! Template registry: the six static workflow definitions.
//!
//! Every template shares the same gathering steps (Notion export or local
//! file lookup, selected by source filter) and ends with a NotebookLM share
//! link handoff.  The shared steps live here; each submodule defines the
//! steps specific to its workflow.

mod audio;
mod flashcards;
mod organize;
mod quiz;
mod revision;
mod summary;

use crate::types::{SourceType, StepType, TemplateStep, WorkflowTemplate, WorkflowType};

pub use audio::AUDIO;
pub use flashcards::FLASHCARDS;
pub use organize::ORGANIZE;
pub use quiz::QUIZ;
pub use revision::REVISION;
pub use summary::SUMMARY;

/// Look up the template for `workflow_type`.  The registry is total.
pub fn template_for(workflow_type: WorkflowType) -> &'static WorkflowTemplate {
    match workflow_type {
        WorkflowType::Flashcards => &FLASHCARDS,
        WorkflowType::Quiz => &QUIZ,
        WorkflowType::Summary => &SUMMARY,
        WorkflowType::Organize => &ORGANIZE,
        WorkflowType::Audio => &AUDIO,
        WorkflowType::Revision => &REVISION,
    }
}

/// Every registered workflow type.
pub fn available_workflows() -> &'static [WorkflowType] {
    &WorkflowType::ALL
}

// ---------------------------------------------------------------------------
// Shared steps
// ---------------------------------------------------------------------------

pub(crate) const NOTION_ONLY: &[SourceType] = &[SourceType::Notion];
pub(crate) const LOCAL_ONLY: &[SourceType] = &[SourceType::LocalFiles, SourceType::Downloads];

pub(crate) const EXPORT_FROM_NOTION: TemplateStep = TemplateStep {
    id: 1,
    name: "Export notes from Notion",
    description: "AccomplishAI will export your {topic} notes from Notion as PDF files.",
    step_type: StepType::Accomplish,
    instruction: "Open notion.so in the browser. In the left sidebar, navigate to the workspace and find the page or database titled \"{topic}\". \
        Click the \"...\" (three-dot menu) in the top-right corner of the page. \
        Select \"Export\". In the export dialog, set Format to \"PDF\", and enable \"Include subpages\" if available. \
        Click \"Export\". Wait for the download to complete. The file will be saved to ~/Downloads.",
    optional: false,
    source_filter: Some(NOTION_ONLY),
};

pub(crate) const LOCATE_FILES: TemplateStep = TemplateStep {
    id: 2,
    name: "Locate your files",
    description: "AccomplishAI will find your {topic} files in your {source} folder.",
    step_type: StepType::Accomplish,
    instruction: "Open Finder. Navigate to the {source} folder. Look for files related to \"{topic}\" — these may be PDFs, \
        Word documents (.docx), or text files. Select all relevant files. If there are multiple files, \
        select them all (Cmd+A or Cmd+Click). Keep this Finder window open — you will upload these files in the next step.",
    optional: false,
    source_filter: Some(LOCAL_ONLY),
};

pub(crate) const PASTE_LINK_NAME: &str = "Paste the NotebookLM link";

/// Final handoff step, always last.
pub(crate) const fn paste_link(id: u32) -> TemplateStep {
    TemplateStep {
        id,
        name: PASTE_LINK_NAME,
        description: "Paste the NotebookLM share link so we can save it for you.",
        step_type: StepType::LinkInput,
        instruction: "Paste the NotebookLM share link here:",
        optional: false,
        source_filter: None,
    }
}

/// Optional LLM cleanup step.  Only the instruction tail differs between
/// templates.
macro_rules! cleanup_step {
    ($id:expr, $description:expr, $purpose:literal) => {
        $crate::types::TemplateStep {
            id: $id,
            name: "Clean up notes (optional)",
            description: $description,
            step_type: $crate::types::StepType::LlmProcess,
            instruction: concat!(
                "Paste your raw notes content here and we'll clean them up — ",
                $purpose
            ),
            optional: true,
            source_filter: None,
        }
    };
}

/// Upload step naming the notebook `"{topic} - <suffix>"`.
macro_rules! upload_step {
    ($id:expr, $suffix:literal) => {
        upload_step!(
            $id,
            $suffix,
            "AccomplishAI will open Google NotebookLM and upload your exported files.",
            "the"
        )
    };
    ($id:expr, $suffix:literal, $description:expr, $which:literal) => {
        $crate::types::TemplateStep {
            id: $id,
            name: "Upload sources to NotebookLM",
            description: $description,
            step_type: $crate::types::StepType::Accomplish,
            instruction: concat!(
                "Open Google NotebookLM at notebooklm.google.com in the browser. ",
                "Click \"New Notebook\" or the \"+\" button to create a new notebook. ",
                "Name the notebook \"{topic} - ",
                $suffix,
                "\". ",
                "In the Sources panel on the left, click \"Add Source\" then select \"Upload files\" (the file upload icon). ",
                "Navigate to ~/Downloads and select ",
                $which,
                " exported {topic} files. Click Open to upload. ",
                "Wait for NotebookLM to finish processing all sources (a loading indicator will appear)."
            ),
            optional: false,
            source_filter: None,
        }
    };
}

/// Share-link step for the notebook `"{topic} - <suffix>"`.
macro_rules! share_step {
    ($id:expr, $suffix:literal, $description:expr) => {
        $crate::types::TemplateStep {
            id: $id,
            name: "Copy the share link",
            description: $description,
            step_type: $crate::types::StepType::Accomplish,
            instruction: concat!(
                "In the NotebookLM notebook \"{topic} - ",
                $suffix,
                "\", click the \"Share\" button in the top-right corner. ",
                "In the sharing dialog, toggle \"Enable sharing via link\" if it is not already on. ",
                "Click the copy icon or the Copy Link button to copy the shareable URL to the clipboard."
            ),
            optional: false,
            source_filter: None,
        }
    };
}

/// Notebook-guide generation step for the notebook `"{topic} - <suffix>"`.
macro_rules! generate_step {
    ($id:expr, $name:expr, $description:expr, $suffix:literal, $tool_sentence:literal, $wait:literal) => {
        $crate::types::TemplateStep {
            id: $id,
            name: $name,
            description: $description,
            step_type: $crate::types::StepType::Accomplish,
            instruction: concat!(
                "In the NotebookLM notebook \"{topic} - ",
                $suffix,
                "\", look at the bottom of the page for the \"Notebook guide\" ",
                $tool_sentence,
                " ",
                $wait
            ),
            optional: false,
            source_filter: None,
        }
    };
}

pub(crate) use {cleanup_step, generate_step, share_step, upload_step};

pub(crate) const DEFAULT_CLEANUP_DESCRIPTION: &str = "Use AI to clean and format your raw notes before uploading. \
    You can skip this step if your notes are already well-formatted.";

pub(crate) const SHARE_DESCRIPTION: &str =
    "AccomplishAI will get the shareable link for your NotebookLM notebook.";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_is_total() {
        for t in available_workflows() {
            assert_eq!(template_for(*t).workflow_type, *t);
        }
        assert_eq!(available_workflows().len(), 6);
    }

    #[test]
    fn step_counts() {
        assert_eq!(FLASHCARDS.steps.len(), 6);
        assert_eq!(QUIZ.steps.len(), 7);
        assert_eq!(SUMMARY.steps.len(), 7);
        assert_eq!(ORGANIZE.steps.len(), 7);
        assert_eq!(AUDIO.steps.len(), 7);
        assert_eq!(REVISION.steps.len(), 9);
    }

    #[test]
    fn template_ids_are_sequential() {
        for t in available_workflows() {
            let ids: Vec<u32> = template_for(*t).steps.iter().map(|s| s.id).collect();
            let expected: Vec<u32> = (1..=ids.len() as u32).collect();
            assert_eq!(ids, expected, "{t}");
        }
    }

    #[test]
    fn every_template_starts_with_exclusive_gathering_steps() {
        for t in available_workflows() {
            let steps = template_for(*t).steps;
            assert_eq!(steps[0].source_filter, Some(NOTION_ONLY));
            assert_eq!(steps[1].source_filter, Some(LOCAL_ONLY));
            assert!(steps[2..].iter().all(|s| s.source_filter.is_none()));
        }
    }

    #[test]
    fn every_template_ends_with_link_input() {
        for t in available_workflows() {
            let last = template_for(*t).steps.last().unwrap();
            assert_eq!(last.step_type, StepType::LinkInput);
            assert_eq!(last.name, PASTE_LINK_NAME);
        }
    }

    #[test]
    fn upload_and_share_name_the_same_notebook() {
        let upload = QUIZ.steps.iter().find(|s| s.name == "Upload sources to NotebookLM").unwrap();
        let share = QUIZ.steps.iter().find(|s| s.name == "Copy the share link").unwrap();
        assert!(upload.instruction.contains("\"{topic} - Quiz\""));
        assert!(share.instruction.contains("\"{topic} - Quiz\""));
    }

    #[test]
    fn revision_has_two_llm_steps() {
        let llm_steps = REVISION
            .steps
            .iter()
            .filter(|s| s.step_type == StepType::LlmProcess)
            .count();
        assert_eq!(llm_steps, 2);
    }
}
