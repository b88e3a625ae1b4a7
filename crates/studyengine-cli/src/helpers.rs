//! Shared helpers for the CLI subcommands.

use std::fmt::Write as _;

use tracing_subscriber::EnvFilter;

use studyengine_intent::{ContextItem, ContextPayload, ContextSource, PopulatedStep, StepStatus, StepType};

// ---------------------------------------------------------------------------
// Tracing
// ---------------------------------------------------------------------------

/// Install the global subscriber.  `RUST_LOG` wins over `default_level`.
pub fn init_tracing(default_level: &str, json: bool) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .compact()
            .init();
    }
}

// ---------------------------------------------------------------------------
// Drag-drop context from flags
// ---------------------------------------------------------------------------

/// Build a context payload from `--notion` and `--local` titles.
pub fn build_context(notion: &[String], local: &[String]) -> Option<ContextPayload> {
    let items: Vec<ContextItem> = notion
        .iter()
        .enumerate()
        .map(|(i, title)| ContextItem::new(format!("notion-{}", i + 1), title, ContextSource::Notion))
        .chain(
            local
                .iter()
                .enumerate()
                .map(|(i, title)| ContextItem::new(format!("local-{}", i + 1), title, ContextSource::Local)),
        )
        .collect();

    (!items.is_empty()).then(|| ContextPayload::from_items(items))
}

// ---------------------------------------------------------------------------
// Checklist rendering
// ---------------------------------------------------------------------------

/// Render a workflow as a plain-text checklist.
pub fn render_checklist(title: &str, subtitle: &str, steps: &[PopulatedStep]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{title}");
    if !subtitle.is_empty() {
        let _ = writeln!(out, "{subtitle}");
    }
    let _ = writeln!(out);

    for step in steps {
        let marker = match step.status {
            StepStatus::Completed => "[x]",
            StepStatus::Active => "[>]",
            StepStatus::Failed => "[!]",
            StepStatus::Pending => "[ ]",
        };
        let kind = match step.step_type {
            StepType::Accomplish => "",
            StepType::LlmProcess => " (llm)",
            StepType::LinkInput => " (paste link)",
        };
        let optional = if step.optional { " (optional)" } else { "" };
        let _ = writeln!(out, "{marker} {}. {}{kind}{optional}", step.id, step.name);
        let _ = writeln!(out, "      {}", step.description);
    }
    out
}
