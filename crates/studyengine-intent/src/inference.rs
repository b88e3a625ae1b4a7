//! Source and topic inference from the prompt and drag-drop context.
//!
//! All functions here are pure and never fail; missing context falls back
//! to local files and a heuristic topic taken from the prompt.

use crate::types::{ContextPayload, ContextSource, SourceType};

/// Label used when no Notion item is present.
pub const LOCAL_FILES_LABEL: &str = "Local files";

/// Label used when at least one Notion item is present.
pub const NOTION_LABEL: &str = "Notion";

/// Topic returned when nothing meaningful survives filtering.
pub const DEFAULT_TOPIC: &str = "Study Material";

const FILLER_WORDS: &[&str] = &[
    "generate", "create", "make", "build", "do", "get", "give", "help", "me", "my", "the", "a",
    "an", "for", "from", "with", "in", "on", "of", "to", "and", "some", "please", "want", "need",
    "i",
];

const WORKFLOW_KEYWORDS: &[&str] = &[
    "flashcard",
    "flashcards",
    "quiz",
    "quizzes",
    "summary",
    "summaries",
    "summarize",
    "organize",
    "audio",
    "podcast",
    "revision",
    "revise",
    "exam",
    "schedule",
];

fn has_notion_item(context: Option<&ContextPayload>) -> bool {
    context.is_some_and(|c| c.items.iter().any(|i| i.source == ContextSource::Notion))
}

/// Normalized source type implied by the context.
pub fn infer_source_type(context: Option<&ContextPayload>) -> SourceType {
    if has_notion_item(context) {
        SourceType::Notion
    } else {
        SourceType::LocalFiles
    }
}

/// Human-readable source label implied by the context.
pub fn infer_source_label(context: Option<&ContextPayload>) -> &'static str {
    if has_notion_item(context) {
        NOTION_LABEL
    } else {
        LOCAL_FILES_LABEL
    }
}

/// Derive a topic string.
///
/// Non-empty context item titles take precedence, joined with `" & "`.
/// Otherwise the prompt is stripped of punctuation, filler words and
/// workflow keywords, and the remaining tokens are capitalized.
pub fn extract_topic(prompt: &str, context: Option<&ContextPayload>) -> String {
    if let Some(context) = context {
        let titles: Vec<&str> = context
            .items
            .iter()
            .map(|i| i.title.as_str())
            .filter(|t| !t.is_empty())
            .collect();
        if !titles.is_empty() {
            return titles.join(" & ");
        }
    }

    let cleaned: String = prompt
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || c.is_whitespace())
        .collect();

    let words: Vec<String> = cleaned
        .split_whitespace()
        .filter(|w| {
            let lower = w.to_lowercase();
            !FILLER_WORDS.contains(&lower.as_str()) && !WORKFLOW_KEYWORDS.contains(&lower.as_str())
        })
        .map(capitalize_first)
        .collect();

    if words.is_empty() {
        DEFAULT_TOPIC.to_owned()
    } else {
        words.join(" ")
    }
}

fn capitalize_first(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ContextItem;

    fn notion(title: &str) -> ContextItem {
        ContextItem::new("n", title, ContextSource::Notion)
    }

    fn local(title: &str) -> ContextItem {
        ContextItem::new("l", title, ContextSource::Local)
    }

    #[test]
    fn no_context_means_local_files() {
        assert_eq!(infer_source_type(None), SourceType::LocalFiles);
        assert_eq!(infer_source_label(None), "Local files");
        let empty = ContextPayload::default();
        assert_eq!(infer_source_type(Some(&empty)), SourceType::LocalFiles);
    }

    #[test]
    fn any_notion_item_wins() {
        let ctx = ContextPayload::from_items(vec![local("a.pdf"), notion("OS Notes")]);
        assert_eq!(infer_source_type(Some(&ctx)), SourceType::Notion);
        assert_eq!(infer_source_label(Some(&ctx)), "Notion");
    }

    #[test]
    fn only_local_items() {
        let ctx = ContextPayload::from_items(vec![local("a.pdf")]);
        assert_eq!(infer_source_type(Some(&ctx)), SourceType::LocalFiles);
        assert_eq!(infer_source_label(Some(&ctx)), "Local files");
    }

    #[test]
    fn topic_from_prompt() {
        assert_eq!(extract_topic("Make flashcards from my OS notes", None), "OS Notes");
    }

    #[test]
    fn topic_strips_punctuation_and_keywords() {
        assert_eq!(
            extract_topic("Please, quiz me on operating-systems!", None),
            "Operatingsystems"
        );
    }

    #[test]
    fn topic_keeps_rest_of_word_unchanged() {
        assert_eq!(extract_topic("summarize dBMS chapter", None), "DBMS Chapter");
    }

    #[test]
    fn topic_falls_back_when_empty() {
        assert_eq!(extract_topic("make me some flashcards", None), DEFAULT_TOPIC);
        assert_eq!(extract_topic("", None), DEFAULT_TOPIC);
        assert_eq!(extract_topic("!!!", None), DEFAULT_TOPIC);
    }

    #[test]
    fn single_context_title_is_used_verbatim() {
        let ctx = ContextPayload::from_items(vec![notion("Operating Systems: Ch. 3")]);
        assert_eq!(extract_topic("make flashcards", Some(&ctx)), "Operating Systems: Ch. 3");
    }

    #[test]
    fn multiple_titles_are_joined() {
        let ctx = ContextPayload::from_items(vec![notion("OS"), local(""), local("DBMS")]);
        assert_eq!(extract_topic("quiz", Some(&ctx)), "OS & DBMS");
    }

    #[test]
    fn blank_titles_fall_back_to_prompt() {
        let ctx = ContextPayload::from_items(vec![local("")]);
        assert_eq!(extract_topic("quiz on networks", Some(&ctx)), "Networks");
    }
}
