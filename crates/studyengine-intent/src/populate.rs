//! Workflow populator.
//!
//! Turns a static template into an owned, display-ready workflow:
//! source filtering, placeholder substitution, id renumbering and status
//! seeding.

use tracing::debug;

use crate::error::{IntentError, Result};
use crate::types::{
    ParsedIntent, PopulatedStep, PopulatedWorkflow, StepStatus, TemplateStep, WorkflowTemplate,
};

/// Populate `template` for `intent`.
///
/// Steps whose source filter excludes the intent's source type are
/// dropped; the survivors are numbered `1..=N` with the first one active.
pub fn populate_workflow(
    template: &WorkflowTemplate,
    intent: &ParsedIntent,
) -> Result<PopulatedWorkflow> {
    let steps: Vec<PopulatedStep> = template
        .steps
        .iter()
        .filter(|step| step.applies_to(intent.source_type))
        .enumerate()
        .map(|(index, step)| populate_step(step, index, intent))
        .collect();

    if steps.is_empty() {
        return Err(IntentError::EmptyWorkflow {
            workflow_type: template.workflow_type,
            source_type: intent.source_type,
        });
    }

    debug!(
        workflow = %template.workflow_type,
        source_type = %intent.source_type,
        kept = steps.len(),
        dropped = template.steps.len() - steps.len(),
        "workflow populated"
    );

    Ok(PopulatedWorkflow {
        workflow_type: template.workflow_type,
        title: fill_placeholders(template.title, intent),
        description: fill_placeholders(template.description, intent),
        estimated_time: template.estimated_time.to_owned(),
        steps,
    })
}

fn populate_step(step: &TemplateStep, index: usize, intent: &ParsedIntent) -> PopulatedStep {
    PopulatedStep {
        id: index as u32 + 1,
        name: fill_placeholders(step.name, intent),
        description: fill_placeholders(step.description, intent),
        step_type: step.step_type,
        instruction: fill_placeholders(step.instruction, intent),
        status: if index == 0 {
            StepStatus::Active
        } else {
            StepStatus::Pending
        },
        optional: step.optional,
    }
}

/// Replace `{topic}`, `{source}` and `{sourceType}` in a single left to
/// right pass.  Substituted text is never rescanned.
pub fn fill_placeholders(text: &str, intent: &ParsedIntent) -> String {
    let replacements: [(&str, &str); 3] = [
        ("{topic}", &intent.topic),
        ("{sourceType}", intent.source_type.as_str()),
        ("{source}", &intent.source),
    ];

    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let tail = &rest[open..];
        match replacements
            .iter()
            .find(|(token, _)| tail.starts_with(token))
        {
            Some((token, value)) => {
                out.push_str(value);
                rest = &tail[token.len()..];
            }
            None => {
                out.push('{');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::templates::{FLASHCARDS, REVISION, available_workflows, template_for};
    use crate::types::{SourceType, StepType, WorkflowType};

    fn intent(workflow_type: WorkflowType, source_type: SourceType) -> ParsedIntent {
        ParsedIntent {
            workflow_type,
            source: match source_type {
                SourceType::Notion => "Notion".into(),
                SourceType::LocalFiles => "Local files".into(),
                SourceType::Downloads => "Downloads folder".into(),
            },
            source_type,
            topic: "OS Notes".into(),
            confidence: 0.9,
        }
    }

    #[test]
    fn placeholders_are_replaced() {
        let i = intent(WorkflowType::Quiz, SourceType::Notion);
        assert_eq!(
            fill_placeholders("{topic} from {source} ({sourceType}) {topic}", &i),
            "OS Notes from Notion (notion) OS Notes"
        );
    }

    #[test]
    fn unknown_braces_are_kept() {
        let i = intent(WorkflowType::Quiz, SourceType::Notion);
        assert_eq!(fill_placeholders("{x} {topic", &i), "{x} {topic");
        assert_eq!(fill_placeholders("{{topic}}", &i), "{OS Notes}");
    }

    #[test]
    fn substituted_values_are_not_rescanned() {
        let mut i = intent(WorkflowType::Quiz, SourceType::LocalFiles);
        i.topic = "{source}".into();
        assert_eq!(fill_placeholders("{topic}|{source}", &i), "{source}|Local files");
    }

    #[test]
    fn notion_flashcards_drop_local_step() {
        let wf = populate_workflow(&FLASHCARDS, &intent(WorkflowType::Flashcards, SourceType::Notion))
            .unwrap();
        assert_eq!(wf.steps.len(), 5);
        assert_eq!(wf.steps[0].name, "Export notes from Notion");
        assert!(wf.steps.iter().all(|s| s.name != "Locate your files"));
    }

    #[test]
    fn local_flashcards_drop_notion_step() {
        let wf = populate_workflow(
            &FLASHCARDS,
            &intent(WorkflowType::Flashcards, SourceType::LocalFiles),
        )
        .unwrap();
        assert_eq!(wf.steps.len(), 5);
        assert_eq!(wf.steps[0].name, "Locate your files");
        assert!(wf.steps[0].instruction.contains("Navigate to the Local files folder"));
    }

    #[test]
    fn local_flashcards_text_is_exact() {
        let wf = populate_workflow(
            &FLASHCARDS,
            &intent(WorkflowType::Flashcards, SourceType::LocalFiles),
        )
        .unwrap();
        assert_eq!(
            wf.steps[0].instruction,
            "Open Finder. Navigate to the Local files folder. Look for files related to \"OS Notes\" \
             — these may be PDFs, Word documents (.docx), or text files. Select all relevant files. \
             If there are multiple files, select them all (Cmd+A or Cmd+Click). Keep this Finder \
             window open — you will upload these files in the next step."
        );
        assert_eq!(
            wf.step(3).unwrap().instruction,
            "In the NotebookLM notebook \"OS Notes - Flashcards\", look at the bottom of the page for \
             the \"Notebook guide\" button or the \"Study Guide\" section. Click on it to open the \
             study tools panel. Find and click the \"Flashcards\" option to generate flashcards from \
             the uploaded sources. Wait for the generation to complete — this may take 15-30 seconds \
             depending on the amount of content."
        );
    }

    #[test]
    fn revision_text_is_exact() {
        let wf = populate_workflow(&REVISION, &intent(WorkflowType::Revision, SourceType::Notion))
            .unwrap();
        assert_eq!(
            wf.step(2).unwrap().instruction,
            "Paste your raw notes content here and we'll clean them up — fixing formatting, removing \
             duplicates, and organizing the content before analysis."
        );
        assert_eq!(
            wf.step(6).unwrap().instruction,
            "Open Google Calendar at calendar.google.com in the browser. For each study session in \
             the revision schedule below, create a new event: click the \"+\" or click on the target \
             date, enter the session title (e.g. \"OS Notes — Chapter 3 Review\"), set the start and \
             end time as specified, and save. Repeat for all sessions. The revision schedule with \
             specific dates, times, and topics will be provided from the previous step."
        );
    }

    #[test]
    fn ids_are_contiguous_and_first_is_active() {
        for t in available_workflows() {
            for s in SourceType::ALL {
                let wf = populate_workflow(template_for(*t), &intent(*t, s)).unwrap();
                let ids: Vec<u32> = wf.steps.iter().map(|s| s.id).collect();
                let expected: Vec<u32> = (1..=wf.steps.len() as u32).collect();
                assert_eq!(ids, expected);
                assert_eq!(
                    wf.steps.iter().filter(|s| s.status == StepStatus::Active).count(),
                    1
                );
                assert_eq!(wf.steps[0].status, StepStatus::Active);
                assert_eq!(wf.steps.len(), template_for(*t).steps.len() - 1);
            }
        }
    }

    #[test]
    fn no_placeholders_survive() {
        for t in available_workflows() {
            let wf = populate_workflow(template_for(*t), &intent(*t, SourceType::Downloads)).unwrap();
            let mut texts = vec![wf.title.clone(), wf.description.clone()];
            for s in &wf.steps {
                texts.extend([s.name.clone(), s.description.clone(), s.instruction.clone()]);
            }
            for text in texts {
                for token in ["{topic}", "{source}", "{sourceType}"] {
                    assert!(!text.contains(token), "{token} left in {text:?}");
                }
            }
        }
    }

    #[test]
    fn revision_keeps_optional_flag_and_title() {
        let wf = populate_workflow(&REVISION, &intent(WorkflowType::Revision, SourceType::Notion))
            .unwrap();
        assert_eq!(wf.title, "Create Revision Plan for OS Notes");
        assert_eq!(wf.steps.len(), 8);
        let cleanup = wf.step(2).unwrap();
        assert_eq!(cleanup.step_type, StepType::LlmProcess);
        assert!(cleanup.optional);
        assert_eq!(wf.step(8).unwrap().step_type, StepType::LinkInput);
    }

    #[test]
    fn zero_surviving_steps_is_an_error() {
        const ONLY_NOTION: &[TemplateStep] = &[crate::templates::EXPORT_FROM_NOTION];
        let template = WorkflowTemplate {
            workflow_type: WorkflowType::Quiz,
            title: "t",
            description: "d",
            estimated_time: "1 min",
            steps: ONLY_NOTION,
        };
        let err = populate_workflow(&template, &intent(WorkflowType::Quiz, SourceType::Downloads))
            .unwrap_err();
        assert!(matches!(
            err,
            IntentError::EmptyWorkflow {
                workflow_type: WorkflowType::Quiz,
                source_type: SourceType::Downloads
            }
        ));
    }
}
