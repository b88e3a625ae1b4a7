//! Rule classifier: the deterministic fast path.
//!
//! Rules are evaluated top-to-bottom and the first one that fires wins.
//! Order is semantically load-bearing: unambiguous keyword groups come
//! first, broader ones later.  Rules marked `requires_study_context` only
//! fire when the prompt also contains a study-context word; otherwise they
//! are skipped and evaluation continues with the next rule.

use regex::Regex;
use tracing::debug;

use crate::error::{IntentError, Result};
use crate::types::WorkflowType;

/// Words that must accompany an ambiguous keyword.  "exam" is not one of
/// them, so a bare "exam" never satisfies its own gate.
///
/// Word boundaries here and in [`default_rules`] are ASCII (`(?-u:\b)`):
/// a non-ASCII letter next to a keyword does not block the match.
pub const STUDY_CONTEXT_PATTERN: &str = r"(?i)(?-u:\b)(notes?|files?|docs?|pages?|material|chapter|lecture|course|class|subject|worksheet|slides?|pdf|textbook|book|study|studies|studying|learn|learning)(?-u:\b)";

/// Declarative form of a rule, before its pattern is compiled.
#[derive(Debug, Clone)]
pub struct RuleSpec {
    pub pattern: &'static str,
    pub workflow_type: WorkflowType,
    pub confidence: f64,
    pub requires_study_context: bool,
}

/// The built-in rule table, in priority order.
pub fn default_rules() -> Vec<RuleSpec> {
    vec![
        // Unambiguous keywords, always match.
        RuleSpec {
            pattern: r"(?i)(?-u:\b)(flash\s?cards?|anki|memory\s?cards?)(?-u:\b)",
            workflow_type: WorkflowType::Flashcards,
            confidence: 0.95,
            requires_study_context: false,
        },
        RuleSpec {
            pattern: r"(?i)(?-u:\b)(summarize|summarise)(?-u:\b)",
            workflow_type: WorkflowType::Summary,
            confidence: 0.9,
            requires_study_context: false,
        },
        RuleSpec {
            pattern: r"(?i)(?-u:\b)(podcast|tts|text\s?to\s?speech)(?-u:\b)",
            workflow_type: WorkflowType::Audio,
            confidence: 0.9,
            requires_study_context: false,
        },
        RuleSpec {
            pattern: r"(?i)(?-u:\b)(quiz(zes)?|practice\s?(questions?)?|mock\s+test(s)?|practice\s+test(s)?)(?-u:\b)",
            workflow_type: WorkflowType::Quiz,
            confidence: 0.8,
            requires_study_context: false,
        },
        // Ambiguous keywords, gated on study context.
        RuleSpec {
            pattern: r"(?i)(?-u:\b)(summary|summaries)(?-u:\b)",
            workflow_type: WorkflowType::Summary,
            confidence: 0.85,
            requires_study_context: true,
        },
        RuleSpec {
            pattern: r"(?i)(?-u:\b)(organize|organise|organizing|organising|structure|restructure)(?-u:\b)",
            workflow_type: WorkflowType::Organize,
            confidence: 0.85,
            requires_study_context: true,
        },
        RuleSpec {
            pattern: r"(?i)(?-u:\b)(audio)(?-u:\b)",
            workflow_type: WorkflowType::Audio,
            confidence: 0.8,
            requires_study_context: true,
        },
        RuleSpec {
            pattern: r"(?i)(?-u:\b)(revision|revise|revising|study\s?plan|study\s*schedule|exam\s*schedule|revision\s*schedule)(?-u:\b)",
            workflow_type: WorkflowType::Revision,
            confidence: 0.85,
            requires_study_context: false,
        },
        RuleSpec {
            pattern: r"(?i)(?-u:\b)(exam(s)?)(?-u:\b)",
            workflow_type: WorkflowType::Revision,
            confidence: 0.75,
            requires_study_context: true,
        },
    ]
}

/// Result of a rule hit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RuleMatch {
    pub workflow_type: WorkflowType,
    pub confidence: f64,
}

/// A compiled rule.
#[derive(Debug, Clone)]
struct Rule {
    regex: Regex,
    workflow_type: WorkflowType,
    confidence: f64,
    requires_study_context: bool,
}

/// Ordered, first-match-wins regex classifier.
#[derive(Debug, Clone)]
pub struct RuleClassifier {
    rules: Vec<Rule>,
    study_context: Regex,
}

impl RuleClassifier {
    /// Compile the built-in rule table.
    pub fn standard() -> Result<Self> {
        Self::new(default_rules())
    }

    /// Compile a custom rule table.  `specs` order is evaluation order.
    pub fn new(specs: Vec<RuleSpec>) -> Result<Self> {
        let rules = specs
            .into_iter()
            .map(|spec| {
                Ok(Rule {
                    regex: compile(spec.pattern)?,
                    workflow_type: spec.workflow_type,
                    confidence: spec.confidence,
                    requires_study_context: spec.requires_study_context,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            rules,
            study_context: compile(STUDY_CONTEXT_PATTERN)?,
        })
    }

    /// Number of compiled rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether the classifier has no rules.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Whether `text` contains a study-context word.
    pub fn has_study_context(&self, text: &str) -> bool {
        self.study_context.is_match(text)
    }

    /// Classify `text`, returning `None` when no rule fires.
    pub fn classify(&self, text: &str) -> Option<RuleMatch> {
        for (index, rule) in self.rules.iter().enumerate() {
            if !rule.regex.is_match(text) {
                continue;
            }
            if rule.requires_study_context && !self.has_study_context(text) {
                debug!(rule = index, workflow = %rule.workflow_type, "keyword matched without study context, skipping");
                continue;
            }
            debug!(rule = index, workflow = %rule.workflow_type, confidence = rule.confidence, "rule matched");
            return Some(RuleMatch {
                workflow_type: rule.workflow_type,
                confidence: rule.confidence,
            });
        }
        None
    }
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| IntentError::InvalidPattern {
        pattern: pattern.to_owned(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(text: &str) -> Option<RuleMatch> {
        RuleClassifier::standard().unwrap().classify(text)
    }

    fn hit(text: &str) -> (WorkflowType, f64) {
        let m = classify(text).unwrap_or_else(|| panic!("expected a rule match for {text:?}"));
        (m.workflow_type, m.confidence)
    }

    #[test]
    fn standard_table_has_nine_rules() {
        assert_eq!(RuleClassifier::standard().unwrap().len(), 9);
    }

    #[test]
    fn flashcard_variants() {
        assert_eq!(hit("Make flashcards from my OS notes"), (WorkflowType::Flashcards, 0.95));
        assert_eq!(hit("flash cards please").0, WorkflowType::Flashcards);
        assert_eq!(hit("export to ANKI").0, WorkflowType::Flashcards);
        assert_eq!(hit("memory card deck").0, WorkflowType::Flashcards);
    }

    #[test]
    fn summarize_is_unambiguous() {
        assert_eq!(hit("summarise this"), (WorkflowType::Summary, 0.9));
    }

    #[test]
    fn podcast_and_tts() {
        assert_eq!(hit("turn it into a podcast"), (WorkflowType::Audio, 0.9));
        assert_eq!(hit("text to speech"), (WorkflowType::Audio, 0.9));
        assert_eq!(hit("TTS"), (WorkflowType::Audio, 0.9));
    }

    #[test]
    fn quiz_does_not_need_context() {
        assert_eq!(hit("quiz me"), (WorkflowType::Quiz, 0.8));
        assert_eq!(hit("some practice questions").0, WorkflowType::Quiz);
        assert_eq!(hit("a mock test").0, WorkflowType::Quiz);
    }

    #[test]
    fn quiz_is_word_bounded() {
        assert!(classify("quizzical look").is_none());
    }

    #[test]
    fn non_ascii_letters_count_as_boundaries() {
        assert_eq!(hit("quizá mañana"), (WorkflowType::Quiz, 0.8));
        assert_eq!(hit("summary for my classé"), (WorkflowType::Summary, 0.85));
        assert!(classify("quizzé").is_none());
    }

    #[test]
    fn first_match_wins_over_later_rules() {
        // Both flashcards and quiz keywords present: flashcards is listed first.
        assert_eq!(hit("flashcards and a quiz").0, WorkflowType::Flashcards);
        // "summarize" outranks "quiz".
        assert_eq!(hit("summarize then quiz").0, WorkflowType::Summary);
    }

    #[test]
    fn gated_summary_needs_context() {
        assert!(classify("give me a summary").is_none());
        assert_eq!(hit("summary of chapter 3"), (WorkflowType::Summary, 0.85));
    }

    #[test]
    fn gated_organize_needs_context() {
        assert!(classify("organize").is_none());
        assert_eq!(hit("organize my lecture notes"), (WorkflowType::Organize, 0.85));
    }

    #[test]
    fn gated_audio_needs_context() {
        assert!(classify("play some audio").is_none());
        assert_eq!(hit("audio version of my notes"), (WorkflowType::Audio, 0.8));
    }

    #[test]
    fn revision_keywords() {
        assert_eq!(hit("revision plan"), (WorkflowType::Revision, 0.85));
        assert_eq!(hit("make a study plan"), (WorkflowType::Revision, 0.85));
        assert_eq!(hit("exam schedule").0, WorkflowType::Revision);
    }

    #[test]
    fn bare_exam_does_not_fire() {
        assert!(classify("exam").is_none());
        assert!(classify("I have exams").is_none());
    }

    #[test]
    fn exam_with_context_fires() {
        assert_eq!(hit("exam prep from my textbook"), (WorkflowType::Revision, 0.75));
    }

    #[test]
    fn unrelated_text_has_no_match() {
        assert!(classify("what is the meaning of life").is_none());
        assert!(classify("").is_none());
    }

    #[test]
    fn custom_rules_keep_their_order() {
        let classifier = RuleClassifier::new(vec![
            RuleSpec {
                pattern: r"(?i)(?-u:\b)cards(?-u:\b)",
                workflow_type: WorkflowType::Quiz,
                confidence: 0.5,
                requires_study_context: false,
            },
            RuleSpec {
                pattern: r"(?i)(?-u:\b)cards(?-u:\b)",
                workflow_type: WorkflowType::Flashcards,
                confidence: 0.9,
                requires_study_context: false,
            },
        ])
        .unwrap();
        assert_eq!(
            classifier.classify("cards").unwrap().workflow_type,
            WorkflowType::Quiz
        );
    }

    #[test]
    fn invalid_pattern_is_reported() {
        let result = RuleClassifier::new(vec![RuleSpec {
            pattern: r"(unclosed",
            workflow_type: WorkflowType::Quiz,
            confidence: 0.5,
            requires_study_context: false,
        }]);
        assert!(matches!(result, Err(IntentError::InvalidPattern { .. })));
    }
}
