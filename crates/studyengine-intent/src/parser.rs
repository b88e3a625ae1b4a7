//! LLM intent parser, the slow path.
//!
//! Sends the prompt (enriched with the source implied by the drag-drop
//! context) to a function-calling model, forces the `parse_study_intent`
//! tool, and validates the returned enum fields against the closed sets.
//! The model may answer `"none"`; rejecting that is the resolver's job.

use std::sync::Arc;

use serde_json::{Value, json};
use tracing::{debug, warn};

use studyengine_llm::{ChatRequest, CompletionBackend, Message, ToolDefinition};

use crate::error::{IntentError, Result};
use crate::inference::{LOCAL_FILES_LABEL, infer_source_label, infer_source_type};
use crate::types::{ContextPayload, ParsedIntent, SourceType, WorkflowType};

/// Name of the forced tool.
pub const PARSE_TOOL_NAME: &str = "parse_study_intent";

/// Topic used when the model leaves it empty.
pub const UNKNOWN_TOPIC: &str = "Unknown Topic";

/// Confidence used when the model returns a non-numeric value.
pub const FALLBACK_CONFIDENCE: f64 = 0.5;

const VALID_WORKFLOW_TYPES: &str = "flashcards, quiz, summary, organize, audio, revision, none";
const VALID_SOURCE_TYPES: &str = "notion, local_files, downloads";

const SYSTEM_PROMPT: &str = r#"You are an intent parser for StudyEngine, an academic workflow automation tool.

Your job is to determine if a user's request is about studying or working with study materials, and if so, extract structured information.

Supported study workflows:
- "flashcards" — generating flashcards or study cards from notes
- "quiz" — creating practice quizzes or tests from study material
- "summary" — condensing notes into a study summary or guide
- "organize" — organizing or structuring scattered notes
- "audio" — generating audio overviews or podcast-style study material
- "revision" — creating a revision/review schedule or exam prep plan
- "none" — the request is NOT about studying, notes, or academics

Note sources:
- "local_files" — files on their computer (default if not mentioned)
- "notion" — Notion workspace
- "downloads" — Downloads folder

IMPORTANT RULES:
1. If the request is clearly NOT about studying, notes, or academic work, return workflow_type: "none" with confidence 0.1.
   Examples of non-study requests: "what is the meaning of life", "hello how are you", "tell me a joke", "what's the weather".
2. If the request is vaguely study-related but doesn't clearly map to a workflow, return your best guess but set confidence below 0.4.
3. Only set confidence above 0.7 if you are genuinely confident the user wants a specific study workflow.
4. Always call the parse_study_intent function."#;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Workflow type as the model may return it, including the `"none"` escape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmWorkflowType {
    Workflow(WorkflowType),
    None,
}

/// An intent as returned by the model, before the confidence gate.
#[derive(Debug, Clone, PartialEq)]
pub struct LlmIntent {
    pub workflow_type: LlmWorkflowType,
    pub source: String,
    pub source_type: SourceType,
    pub topic: String,
    pub confidence: f64,
}

impl LlmIntent {
    /// Convert into a [`ParsedIntent`], or `None` when the model said `"none"`.
    pub fn into_parsed(self) -> Option<ParsedIntent> {
        match self.workflow_type {
            LlmWorkflowType::Workflow(workflow_type) => Some(ParsedIntent {
                workflow_type,
                source: self.source,
                source_type: self.source_type,
                topic: self.topic,
                confidence: self.confidence,
            }),
            LlmWorkflowType::None => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Parser
// ---------------------------------------------------------------------------

/// Function-calling intent parser.
pub struct LlmIntentParser {
    llm: Arc<dyn CompletionBackend>,
    /// Empty means the backend's default model.
    model: String,
}

impl LlmIntentParser {
    pub fn new(llm: Arc<dyn CompletionBackend>) -> Self {
        Self {
            llm,
            model: String::new(),
        }
    }

    /// Override the model used for parsing requests.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Ask the model to classify `prompt`.
    ///
    /// Errors from the backend and schema violations are returned as-is;
    /// there is no local retry.
    pub async fn parse_intent(
        &self,
        prompt: &str,
        context: Option<&ContextPayload>,
    ) -> Result<LlmIntent> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                Message::system(SYSTEM_PROMPT),
                Message::user(build_user_prompt(prompt, context)),
            ],
            tools: vec![parse_tool()],
            tool_choice: Some(PARSE_TOOL_NAME.to_owned()),
            ..ChatRequest::default()
        };

        debug!(prompt_len = prompt.len(), "requesting LLM intent parse");
        let response = self.llm.complete(&request).await?;

        let call = response
            .first_tool_call()
            .filter(|c| c.name == PARSE_TOOL_NAME)
            .ok_or(IntentError::MissingFunctionCall {
                function: PARSE_TOOL_NAME,
            })?;

        let intent = parse_function_arguments(&call.arguments)?;
        debug!(
            workflow = ?intent.workflow_type,
            source_type = %intent.source_type,
            confidence = intent.confidence,
            "LLM returned intent"
        );
        Ok(intent)
    }
}

/// The user message sent to the model.
pub fn build_user_prompt(prompt: &str, context: Option<&ContextPayload>) -> String {
    format!(
        "User Request: {prompt}\n\n[System Context: Based on provided context/files, the expected source is \"{label}\" (source_type: \"{source_type}\") unless the user request explicitly overrides it.]",
        label = infer_source_label(context),
        source_type = infer_source_type(context),
    )
}

/// The forced tool definition.
pub fn parse_tool() -> ToolDefinition {
    ToolDefinition {
        name: PARSE_TOOL_NAME.to_owned(),
        description: "Parse a student's natural language request into a structured study workflow intent. \
            Extract what type of study material they want, where their notes are, and what topic/subject it's about."
            .to_owned(),
        parameters: json!({
            "type": "object",
            "properties": {
                "workflow_type": {
                    "type": "string",
                    "enum": ["flashcards", "quiz", "summary", "organize", "audio", "revision", "none"],
                    "description": "\"flashcards\" for flashcard/study card generation, \
                        \"quiz\" for practice quiz/test generation, \
                        \"summary\" for condensed study summary/guide, \
                        \"organize\" for organizing and structuring scattered notes, \
                        \"audio\" for audio overview/podcast-style study material, \
                        \"revision\" for creating a revision/review schedule with calendar events, \
                        \"none\" if the request is NOT related to studying, academics, or working with notes/study materials."
                },
                "source": {
                    "type": "string",
                    "description": "Where the notes are. Examples: \"local files\", \"Notion\", \"Downloads folder\". \
                        Default to \"local files\" if not specified."
                },
                "source_type": {
                    "type": "string",
                    "enum": ["notion", "local_files", "downloads"],
                    "description": "Normalized source type. \"notion\" if notes are in Notion, \
                        \"local_files\" if notes are on the local machine (Desktop, Documents, specific folder), \
                        \"downloads\" if notes are in the Downloads folder. \
                        Default to \"local_files\" if not specified."
                },
                "topic": {
                    "type": "string",
                    "description": "The subject or topic. Examples: \"Operating Systems\", \"DBMS Chapter 5\"."
                },
                "confidence": {
                    "type": "number",
                    "description": "How confident you are in this parsing, 0.0 to 1.0."
                }
            },
            "required": ["workflow_type", "source", "source_type", "topic", "confidence"]
        }),
    }
}

/// Decode and validate the raw function-call argument string.
pub fn parse_function_arguments(raw: &str) -> Result<LlmIntent> {
    let args: Value = serde_json::from_str(raw).map_err(|e| {
        warn!(error = %e, "malformed function call arguments");
        IntentError::MalformedArguments {
            reason: e.to_string(),
        }
    })?;

    let workflow_value = args.get("workflow_type").unwrap_or(&Value::Null);
    let workflow_type = match workflow_value.as_str() {
        Some("none") => LlmWorkflowType::None,
        Some(s) => s
            .parse::<WorkflowType>()
            .map(LlmWorkflowType::Workflow)
            .map_err(|_| invalid_workflow(workflow_value))?,
        None => return Err(invalid_workflow(workflow_value)),
    };

    let source_value = args.get("source_type").unwrap_or(&Value::Null);
    let source_type = source_value
        .as_str()
        .and_then(|s| s.parse::<SourceType>().ok())
        .ok_or_else(|| IntentError::InvalidSourceType {
            value: source_value.to_string(),
            valid: VALID_SOURCE_TYPES.to_owned(),
        })?;

    Ok(LlmIntent {
        workflow_type,
        source: non_empty_str(&args, "source").unwrap_or(LOCAL_FILES_LABEL).to_owned(),
        source_type,
        topic: non_empty_str(&args, "topic").unwrap_or(UNKNOWN_TOPIC).to_owned(),
        confidence: args
            .get("confidence")
            .and_then(Value::as_f64)
            .unwrap_or(FALLBACK_CONFIDENCE),
    })
}

fn invalid_workflow(value: &Value) -> IntentError {
    IntentError::InvalidWorkflowType {
        value: value.to_string(),
        valid: VALID_WORKFLOW_TYPES.to_owned(),
    }
}

fn non_empty_str<'a>(args: &'a Value, key: &str) -> Option<&'a str> {
    args.get(key).and_then(Value::as_str).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use studyengine_llm::{LlmError, LlmResponse, ToolCall};

    use super::*;
    use crate::types::{ContextItem, ContextSource};

    /// Backend that replays canned responses and records requests.
    struct Scripted {
        responses: Mutex<VecDeque<studyengine_llm::Result<LlmResponse>>>,
        requests: Mutex<Vec<ChatRequest>>,
    }

    impl Scripted {
        fn new(responses: Vec<studyengine_llm::Result<LlmResponse>>) -> Arc<Self> {
            Arc::new(Self {
                responses: Mutex::new(responses.into()),
                requests: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl CompletionBackend for Scripted {
        async fn complete(&self, request: &ChatRequest) -> studyengine_llm::Result<LlmResponse> {
            self.requests.lock().unwrap().push(request.clone());
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .expect("no scripted response left")
        }
    }

    fn call(arguments: &str) -> studyengine_llm::Result<LlmResponse> {
        Ok(LlmResponse::ToolCalls(vec![ToolCall {
            id: "call_1".into(),
            name: PARSE_TOOL_NAME.into(),
            arguments: arguments.into(),
        }]))
    }

    #[test]
    fn user_prompt_embeds_inferred_source() {
        let ctx = ContextPayload::from_items(vec![ContextItem::new("p", "OS", ContextSource::Notion)]);
        let text = build_user_prompt("help me study", Some(&ctx));
        assert!(text.starts_with("User Request: help me study\n\n"));
        assert!(text.contains(r#"the expected source is "Notion" (source_type: "notion")"#));

        let text = build_user_prompt("x", None);
        assert!(text.contains(r#""Local files" (source_type: "local_files")"#));
    }

    #[test]
    fn tool_schema_requires_all_fields() {
        let tool = parse_tool();
        let required = tool.parameters["required"].as_array().unwrap();
        assert_eq!(required.len(), 5);
        let enum_values = tool.parameters["properties"]["workflow_type"]["enum"]
            .as_array()
            .unwrap();
        assert!(enum_values.iter().any(|v| v == "none"));
    }

    #[test]
    fn valid_arguments() {
        let intent = parse_function_arguments(
            r#"{"workflow_type":"quiz","source":"Notion","source_type":"notion","topic":"DBMS","confidence":0.82}"#,
        )
        .unwrap();
        assert_eq!(intent.workflow_type, LlmWorkflowType::Workflow(WorkflowType::Quiz));
        assert_eq!(intent.source, "Notion");
        assert_eq!(intent.source_type, SourceType::Notion);
        assert_eq!(intent.topic, "DBMS");
        assert!((intent.confidence - 0.82).abs() < f64::EPSILON);
    }

    #[test]
    fn none_is_representable() {
        let intent = parse_function_arguments(
            r#"{"workflow_type":"none","source":"","source_type":"local_files","topic":"","confidence":0.1}"#,
        )
        .unwrap();
        assert_eq!(intent.workflow_type, LlmWorkflowType::None);
        assert!(intent.into_parsed().is_none());
    }

    #[test]
    fn defaults_fill_missing_fields() {
        let intent = parse_function_arguments(
            r#"{"workflow_type":"summary","source":"","source_type":"downloads","confidence":"high"}"#,
        )
        .unwrap();
        assert_eq!(intent.source, "Local files");
        assert_eq!(intent.topic, "Unknown Topic");
        assert!((intent.confidence - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn malformed_json_is_rejected() {
        let err = parse_function_arguments("{not json").unwrap_err();
        assert!(matches!(err, IntentError::MalformedArguments { .. }));
    }

    #[test]
    fn unknown_workflow_type_is_rejected() {
        let err = parse_function_arguments(
            r#"{"workflow_type":"essay","source_type":"notion","confidence":0.9}"#,
        )
        .unwrap_err();
        match err {
            IntentError::InvalidWorkflowType { value, valid } => {
                assert_eq!(value, "\"essay\"");
                assert!(valid.contains("none"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn unknown_source_type_is_rejected() {
        let err = parse_function_arguments(
            r#"{"workflow_type":"quiz","source_type":"dropbox","confidence":0.9}"#,
        )
        .unwrap_err();
        assert!(matches!(err, IntentError::InvalidSourceType { .. }));
    }

    #[tokio::test]
    async fn request_forces_the_tool() {
        let backend = Scripted::new(vec![call(
            r#"{"workflow_type":"organize","source":"Notion","source_type":"notion","topic":"Bio","confidence":0.8}"#,
        )]);
        let parser = LlmIntentParser::new(backend.clone()).with_model("gpt-4o-mini");

        let intent = parser.parse_intent("tidy up my bio", None).await.unwrap();
        assert_eq!(intent.workflow_type, LlmWorkflowType::Workflow(WorkflowType::Organize));

        let requests = backend.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].model, "gpt-4o-mini");
        assert_eq!(requests[0].tool_choice.as_deref(), Some(PARSE_TOOL_NAME));
        assert_eq!(requests[0].tools.len(), 1);
        assert_eq!(requests[0].messages.len(), 2);
    }

    #[tokio::test]
    async fn text_reply_is_missing_function_call() {
        let backend = Scripted::new(vec![Ok(LlmResponse::Text("hello".into()))]);
        let parser = LlmIntentParser::new(backend);
        let err = parser.parse_intent("hi", None).await.unwrap_err();
        assert!(matches!(err, IntentError::MissingFunctionCall { .. }));
    }

    #[tokio::test]
    async fn backend_error_propagates() {
        let backend = Scripted::new(vec![Err(LlmError::ApiStatus {
            status: 500,
            body: "boom".into(),
        })]);
        let parser = LlmIntentParser::new(backend);
        let err = parser.parse_intent("hi", None).await.unwrap_err();
        assert!(matches!(err, IntentError::Llm(LlmError::ApiStatus { status: 500, .. })));
    }
}
