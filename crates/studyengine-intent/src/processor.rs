//! Notes processor: single-shot LLM formatting of raw study notes.
//!
//! Backs the optional `llm_process` steps.  The revision schedule kind
//! returns JSON that [`parse_revision_plan`] decodes into a
//! [`RevisionPlan`].

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use studyengine_llm::{ChatRequest, CompletionBackend, LlmResponse, Message};

use crate::error::{IntentError, Result};

/// Low temperature keeps formatting consistent between runs.
const PROCESS_TEMPERATURE: f32 = 0.3;

// ---------------------------------------------------------------------------
// Kinds and prompts
// ---------------------------------------------------------------------------

/// What the processor should do with the notes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessKind {
    Cleanup,
    FlashcardFormat,
    QuizFormat,
    RevisionSchedule,
}

impl ProcessKind {
    pub const ALL: [ProcessKind; 4] = [
        Self::Cleanup,
        Self::FlashcardFormat,
        Self::QuizFormat,
        Self::RevisionSchedule,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cleanup => "cleanup",
            Self::FlashcardFormat => "flashcard_format",
            Self::QuizFormat => "quiz_format",
            Self::RevisionSchedule => "revision_schedule",
        }
    }

    /// Comma-separated list of every kind, for error messages.
    pub fn valid_list() -> String {
        Self::ALL.map(Self::as_str).join(", ")
    }

    /// The system prompt for this kind.
    pub fn system_prompt(self) -> &'static str {
        match self {
            Self::Cleanup => CLEANUP_PROMPT,
            Self::FlashcardFormat => FLASHCARD_FORMAT_PROMPT,
            Self::QuizFormat => QUIZ_FORMAT_PROMPT,
            Self::RevisionSchedule => REVISION_SCHEDULE_PROMPT,
        }
    }
}

impl fmt::Display for ProcessKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProcessKind {
    type Err = IntentError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| IntentError::UnknownProcessKind {
                value: s.to_owned(),
                valid: Self::valid_list(),
            })
    }
}

const CLEANUP_PROMPT: &str = "You are a study notes formatter. The student has provided raw, messy notes.
Your job is to clean them up:
- Fix spelling and grammar errors
- Remove duplicates and redundant content
- Organize into clear sections with headings
- Preserve all factual content — do NOT add information that isn't there
- Use Markdown formatting for structure

Return ONLY the cleaned notes, no commentary.";

const FLASHCARD_FORMAT_PROMPT: &str = "You are a study material formatter. The student wants to turn these notes into flashcard-ready content.
Your job is to restructure the content:
- Identify key concepts, definitions, and facts
- Organize into question-answer pairs where possible
- Group related concepts together
- Remove filler text and keep only study-relevant content
- Use Markdown formatting

Return ONLY the formatted content, no commentary.";

const QUIZ_FORMAT_PROMPT: &str = "You are a study material formatter. The student wants to turn these notes into quiz-ready content.
Your job is to restructure the content:
- Identify testable facts, concepts, and relationships
- Highlight key definitions and their explanations
- Note important distinctions and comparisons
- Remove filler text and keep only quiz-relevant content
- Use Markdown formatting

Return ONLY the formatted content, no commentary.";

const REVISION_SCHEDULE_PROMPT: &str = r#"You are a spaced-repetition study planner. The student has provided their study material or topic list.
Your job is to generate a revision schedule using spaced-repetition intervals (Day 1, Day 3, Day 7, Day 14, Day 30).

Analyze the content and:
- Break it into logical study topics/chunks
- Assign each topic a difficulty estimate (easy, medium, hard)
- Harder topics get more frequent review sessions
- Distribute sessions so no single day is overloaded
- Each session should be 30-60 minutes

Return ONLY valid JSON (no markdown fences, no commentary) in this exact format:
{
  "events": [
    {
      "day_offset": 1,
      "topic": "Topic name or chapter",
      "duration_minutes": 45,
      "difficulty": "medium",
      "session_type": "initial_review"
    },
    {
      "day_offset": 3,
      "topic": "Topic name or chapter",
      "duration_minutes": 30,
      "difficulty": "medium",
      "session_type": "spaced_review"
    }
  ],
  "total_sessions": 12,
  "estimated_days": 30
}

session_type must be one of: "initial_review", "spaced_review", "deep_dive", "practice_problems".
day_offset is the number of days from today (1 = tomorrow)."#;

// ---------------------------------------------------------------------------
// Revision plan
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionType {
    InitialReview,
    SpacedReview,
    DeepDive,
    PracticeProblems,
}

/// One study session in a revision plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevisionEvent {
    /// Days from today, `1` is tomorrow.
    pub day_offset: u32,
    pub topic: String,
    pub duration_minutes: u32,
    pub difficulty: Difficulty,
    pub session_type: SessionType,
}

/// A spaced-repetition schedule produced by the revision prompt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevisionPlan {
    pub events: Vec<RevisionEvent>,
    pub total_sessions: u32,
    pub estimated_days: u32,
}

impl RevisionPlan {
    /// Day offset of the earliest session.
    pub fn first_day_offset(&self) -> Option<u32> {
        self.events.iter().map(|e| e.day_offset).min()
    }
}

/// Decode a revision plan, tolerating markdown code fences.
pub fn parse_revision_plan(text: &str) -> Result<RevisionPlan> {
    let cleaned = text.trim();
    let cleaned = cleaned.strip_prefix("```json").unwrap_or(cleaned);
    let cleaned = cleaned.strip_prefix("```").unwrap_or(cleaned);
    let cleaned = cleaned.strip_suffix("```").unwrap_or(cleaned);
    let cleaned = cleaned.trim();

    let plan: RevisionPlan =
        serde_json::from_str(cleaned).map_err(|e| IntentError::InvalidRevisionPlan {
            reason: e.to_string(),
        })?;

    if plan.events.is_empty() {
        return Err(IntentError::InvalidRevisionPlan {
            reason: "plan contains no events".into(),
        });
    }
    Ok(plan)
}

// ---------------------------------------------------------------------------
// Processor
// ---------------------------------------------------------------------------

/// Sends notes through a fixed-prompt chat completion.
pub struct NotesProcessor {
    llm: Arc<dyn CompletionBackend>,
    model: String,
}

impl NotesProcessor {
    pub fn new(llm: Arc<dyn CompletionBackend>) -> Self {
        Self {
            llm,
            model: String::new(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Process `content` according to `kind` and return the model's text.
    pub async fn process(&self, content: &str, kind: ProcessKind) -> Result<String> {
        let content = content.trim();
        if content.is_empty() {
            return Err(IntentError::EmptyContent);
        }

        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                Message::system(kind.system_prompt()),
                Message::user(content),
            ],
            temperature: Some(PROCESS_TEMPERATURE),
            ..ChatRequest::default()
        };

        debug!(kind = %kind, content_len = content.len(), "processing notes");
        match self.llm.complete(&request).await? {
            LlmResponse::Text(text) if !text.trim().is_empty() => {
                info!(kind = %kind, output_len = text.len(), "notes processed");
                Ok(text)
            }
            _ => Err(IntentError::EmptyCompletion),
        }
    }

    /// Run the revision schedule prompt and decode the result.
    pub async fn revision_plan(&self, content: &str) -> Result<RevisionPlan> {
        let text = self.process(content, ProcessKind::RevisionSchedule).await?;
        parse_revision_plan(&text)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;

    struct Echo {
        reply: String,
        seen: Mutex<Option<ChatRequest>>,
    }

    impl Echo {
        fn new(reply: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: reply.into(),
                seen: Mutex::new(None),
            })
        }
    }

    #[async_trait]
    impl CompletionBackend for Echo {
        async fn complete(&self, request: &ChatRequest) -> studyengine_llm::Result<LlmResponse> {
            *self.seen.lock().unwrap() = Some(request.clone());
            Ok(LlmResponse::Text(self.reply.clone()))
        }
    }

    const PLAN_JSON: &str = r#"{
        "events": [
            {"day_offset": 3, "topic": "Paging", "duration_minutes": 30, "difficulty": "hard", "session_type": "spaced_review"},
            {"day_offset": 1, "topic": "Processes", "duration_minutes": 45, "difficulty": "medium", "session_type": "initial_review"}
        ],
        "total_sessions": 2,
        "estimated_days": 3
    }"#;

    #[test]
    fn kind_names() {
        assert_eq!("quiz_format".parse::<ProcessKind>().unwrap(), ProcessKind::QuizFormat);
        let err = "poem".parse::<ProcessKind>().unwrap_err();
        assert!(err.to_string().contains("cleanup, flashcard_format, quiz_format, revision_schedule"));
    }

    #[tokio::test]
    async fn sends_trimmed_content_with_kind_prompt() {
        let backend = Echo::new("# Clean");
        let processor = NotesProcessor::new(backend.clone());
        let out = processor.process("  raw notes \n", ProcessKind::Cleanup).await.unwrap();
        assert_eq!(out, "# Clean");

        let seen = backend.seen.lock().unwrap().clone().unwrap();
        assert_eq!(seen.messages[0].content, CLEANUP_PROMPT);
        assert_eq!(seen.messages[1].content, "raw notes");
        assert_eq!(seen.temperature, Some(0.3));
        assert!(seen.tools.is_empty());
    }

    #[tokio::test]
    async fn empty_content_is_rejected_without_a_call() {
        let backend = Echo::new("x");
        let processor = NotesProcessor::new(backend.clone());
        let err = processor.process("   ", ProcessKind::Cleanup).await.unwrap_err();
        assert!(matches!(err, IntentError::EmptyContent));
        assert!(backend.seen.lock().unwrap().is_none());
    }

    #[tokio::test]
    async fn empty_reply_is_an_error() {
        let processor = NotesProcessor::new(Echo::new("  "));
        let err = processor.process("notes", ProcessKind::QuizFormat).await.unwrap_err();
        assert!(matches!(err, IntentError::EmptyCompletion));
    }

    #[test]
    fn plan_parses_with_fences() {
        let fenced = format!("```json\n{PLAN_JSON}\n```");
        let plan = parse_revision_plan(&fenced).unwrap();
        assert_eq!(plan.events.len(), 2);
        assert_eq!(plan.events[0].difficulty, Difficulty::Hard);
        assert_eq!(plan.first_day_offset(), Some(1));
    }

    #[test]
    fn plan_rejects_bad_session_type() {
        let bad = PLAN_JSON.replace("spaced_review", "cramming");
        assert!(matches!(
            parse_revision_plan(&bad),
            Err(IntentError::InvalidRevisionPlan { .. })
        ));
    }

    #[test]
    fn plan_rejects_empty_events() {
        let empty = r#"{"events": [], "total_sessions": 0, "estimated_days": 0}"#;
        assert!(parse_revision_plan(empty).is_err());
    }

    #[tokio::test]
    async fn revision_plan_round_trip_through_processor() {
        let processor = NotesProcessor::new(Echo::new(PLAN_JSON)).with_model("gpt-4o");
        let plan = processor.revision_plan("Ch 1: Processes\nCh 2: Paging").await.unwrap();
        assert_eq!(plan.total_sessions, 2);
    }
}
