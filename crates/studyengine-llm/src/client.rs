//! OpenAI Chat Completions client.
//!
//! Posts to `{base_url}/chat/completions`, so any OpenAI-compatible server
//! (Ollama, vLLM, Together) works as well.  Requests are non-streaming:
//! every caller wants exactly one structured answer.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::backend::CompletionBackend;
use crate::error::{LlmError, Result};
use crate::types::{ChatRequest, LlmResponse, ToolCall};

pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Model for intent parsing and notes processing unless configured otherwise.
pub const DEFAULT_MODEL: &str = "gpt-4o";

/// Where the API key is read from.
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

const DEFAULT_MAX_TOKENS: u32 = 4096;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Endpoint, credentials and defaults for [`LlmClient`].
#[derive(Debug, Clone)]
pub struct LlmClientConfig {
    pub api_key: String,
    /// Without the `/chat/completions` suffix.
    pub base_url: String,
    /// Used when a [`ChatRequest`] leaves `model` empty.
    pub default_model: String,
    /// Used when a [`ChatRequest`] leaves `max_tokens` unset.
    pub max_tokens: u32,
}

impl LlmClientConfig {
    /// api.openai.com with the given key and model.
    pub fn openai(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self::openai_compatible(api_key, model, OPENAI_BASE_URL)
    }

    /// A self-hosted or third-party server speaking the same protocol.
    pub fn openai_compatible(
        api_key: impl Into<String>,
        model: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: base_url.into(),
            default_model: model.into(),
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }
}

impl Default for LlmClientConfig {
    fn default() -> Self {
        Self::openai(String::new(), DEFAULT_MODEL)
    }
}

/// Cheap to clone; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct LlmClient {
    config: Arc<LlmClientConfig>,
    endpoint: String,
    http: reqwest::Client,
}

impl LlmClient {
    /// Fails with [`LlmError::MissingApiKey`] for a blank key.
    pub fn new(config: LlmClientConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(LlmError::MissingApiKey {
                env_var: API_KEY_ENV,
            });
        }

        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        let endpoint = format!(
            "{}/chat/completions",
            config.base_url.trim_end_matches('/')
        );

        Ok(Self {
            config: Arc::new(config),
            endpoint,
            http,
        })
    }

    pub fn default_model(&self) -> &str {
        &self.config.default_model
    }

    /// One completion round trip.
    pub async fn chat(&self, request: &ChatRequest) -> Result<LlmResponse> {
        let body = self.wire_request(request);
        debug!(endpoint = %self.endpoint, model = body.model, "sending completion request");

        let resp = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        let text = resp.text().await?;
        if !status.is_success() {
            return Err(LlmError::ApiStatus {
                status: status.as_u16(),
                body: text,
            });
        }

        decode_response(&text)
    }

    fn wire_request<'a>(&'a self, request: &'a ChatRequest) -> wire::Request<'a> {
        let model = match request.model.as_str() {
            "" => self.config.default_model.as_str(),
            m => m,
        };

        wire::Request {
            model,
            max_tokens: request.max_tokens.unwrap_or(self.config.max_tokens),
            temperature: request.temperature,
            messages: request
                .messages
                .iter()
                .map(|m| wire::OutMessage {
                    role: m.role,
                    content: &m.content,
                })
                .collect(),
            tools: request
                .tools
                .iter()
                .map(|t| wire::Tool {
                    kind: "function",
                    function: wire::FunctionSpec {
                        name: &t.name,
                        description: &t.description,
                        parameters: &t.parameters,
                    },
                })
                .collect(),
            tool_choice: request.tool_choice.as_deref().map(|name| wire::ToolChoice {
                kind: "function",
                function: wire::Named { name },
            }),
        }
    }
}

#[async_trait]
impl CompletionBackend for LlmClient {
    async fn complete(&self, request: &ChatRequest) -> Result<LlmResponse> {
        self.chat(request).await
    }
}

/// Decode a Chat Completions body.
///
/// A non-empty `tool_calls` array wins over `content`.  Calls whose `type`
/// is present and not `"function"` are dropped.  Arguments are kept as the
/// raw string the model produced.
pub fn decode_response(body: &str) -> Result<LlmResponse> {
    let parsed: wire::Response = serde_json::from_str(body).map_err(|e| LlmError::ParseFailed {
        reason: format!("invalid completion body: {e}"),
    })?;

    let message = parsed
        .choices
        .into_iter()
        .next()
        .map(|c| c.message)
        .ok_or_else(|| LlmError::ParseFailed {
            reason: "completion has no choices".into(),
        })?;

    let calls: Vec<ToolCall> = message
        .tool_calls
        .into_iter()
        .filter(|c| c.kind.as_deref().is_none_or(|k| k == "function"))
        .map(|c| ToolCall {
            id: c.id,
            name: c.function.name,
            arguments: c.function.arguments,
        })
        .collect();

    if calls.is_empty() {
        Ok(LlmResponse::Text(message.content.unwrap_or_default()))
    } else {
        Ok(LlmResponse::ToolCalls(calls))
    }
}

/// Request and response shapes of the Chat Completions endpoint.
mod wire {
    use serde::{Deserialize, Serialize};
    use serde_json::Value;

    use crate::types::Role;

    #[derive(Serialize)]
    pub struct Request<'a> {
        pub model: &'a str,
        pub max_tokens: u32,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub temperature: Option<f32>,
        pub messages: Vec<OutMessage<'a>>,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        pub tools: Vec<Tool<'a>>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub tool_choice: Option<ToolChoice<'a>>,
    }

    #[derive(Serialize)]
    pub struct OutMessage<'a> {
        pub role: Role,
        pub content: &'a str,
    }

    #[derive(Serialize)]
    pub struct Tool<'a> {
        #[serde(rename = "type")]
        pub kind: &'static str,
        pub function: FunctionSpec<'a>,
    }

    #[derive(Serialize)]
    pub struct FunctionSpec<'a> {
        pub name: &'a str,
        pub description: &'a str,
        pub parameters: &'a Value,
    }

    #[derive(Serialize)]
    pub struct ToolChoice<'a> {
        #[serde(rename = "type")]
        pub kind: &'static str,
        pub function: Named<'a>,
    }

    #[derive(Serialize)]
    pub struct Named<'a> {
        pub name: &'a str,
    }

    #[derive(Deserialize)]
    pub struct Response {
        #[serde(default)]
        pub choices: Vec<Choice>,
    }

    #[derive(Deserialize)]
    pub struct Choice {
        pub message: InMessage,
    }

    #[derive(Deserialize)]
    pub struct InMessage {
        #[serde(default)]
        pub content: Option<String>,
        #[serde(default)]
        pub tool_calls: Vec<InToolCall>,
    }

    #[derive(Deserialize)]
    pub struct InToolCall {
        #[serde(default)]
        pub id: String,
        #[serde(rename = "type", default)]
        pub kind: Option<String>,
        pub function: InFunction,
    }

    #[derive(Deserialize)]
    pub struct InFunction {
        pub name: String,
        #[serde(default)]
        pub arguments: String,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};

    use super::*;
    use crate::types::{Message, ToolDefinition};

    fn client() -> LlmClient {
        LlmClient::new(LlmClientConfig::openai("sk-test", DEFAULT_MODEL)).unwrap()
    }

    fn body_of(request: &ChatRequest) -> Value {
        let client = client();
        serde_json::to_value(client.wire_request(request)).unwrap()
    }

    #[test]
    fn blank_keys_are_refused() {
        for key in ["", "  \t"] {
            let err = LlmClient::new(LlmClientConfig::openai(key, DEFAULT_MODEL)).unwrap_err();
            assert!(matches!(err, LlmError::MissingApiKey { env_var: API_KEY_ENV }));
        }
    }

    #[test]
    fn endpoint_ignores_trailing_slash() {
        let cfg = LlmClientConfig::openai_compatible("k", "llama3", "http://localhost:11434/v1/");
        assert_eq!(cfg.max_tokens, DEFAULT_MAX_TOKENS);
        let client = LlmClient::new(cfg).unwrap();
        assert_eq!(client.endpoint, "http://localhost:11434/v1/chat/completions");
        assert_eq!(client.default_model(), "llama3");
    }

    #[test]
    fn plain_request_uses_client_defaults() {
        let body = body_of(&ChatRequest {
            messages: vec![Message::system("Clean these notes."), Message::user("raw")],
            temperature: Some(0.5),
            ..Default::default()
        });

        assert_eq!(body["model"], DEFAULT_MODEL);
        assert_eq!(body["max_tokens"], DEFAULT_MAX_TOKENS);
        assert_eq!(body["temperature"], 0.5);
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1], json!({"role": "user", "content": "raw"}));
        assert!(body.get("tools").is_none());
        assert!(body.get("tool_choice").is_none());
    }

    #[test]
    fn function_call_is_forced_by_name() {
        let body = body_of(&ChatRequest {
            model: "gpt-4o-mini".into(),
            messages: vec![Message::user("quiz me on OS")],
            tools: vec![ToolDefinition {
                name: "parse_study_intent".into(),
                description: "Classify".into(),
                parameters: json!({"type": "object"}),
            }],
            tool_choice: Some("parse_study_intent".into()),
            max_tokens: Some(300),
            temperature: None,
        });

        assert_eq!(body["model"], "gpt-4o-mini");
        assert_eq!(body["max_tokens"], 300);
        assert!(body.get("temperature").is_none());
        assert_eq!(
            body["tools"][0],
            json!({
                "type": "function",
                "function": {
                    "name": "parse_study_intent",
                    "description": "Classify",
                    "parameters": {"type": "object"}
                }
            })
        );
        assert_eq!(
            body["tool_choice"],
            json!({"type": "function", "function": {"name": "parse_study_intent"}})
        );
    }

    #[test]
    fn text_answer_decodes() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":"Tidy notes"}}]}"#;
        match decode_response(body).unwrap() {
            LlmResponse::Text(text) => assert_eq!(text, "Tidy notes"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn tool_call_arguments_stay_raw() {
        let body = json!({
            "choices": [{
                "message": {
                    "content": null,
                    "tool_calls": [
                        {"id": "c1", "type": "function",
                         "function": {"name": "parse_study_intent", "arguments": "{\"workflow_type\":\"quiz\"}"}},
                        {"id": "c2", "type": "retrieval",
                         "function": {"name": "other"}}
                    ]
                }
            }]
        })
        .to_string();

        let LlmResponse::ToolCalls(calls) = decode_response(&body).unwrap() else {
            panic!("expected tool calls");
        };
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].id, "c1");
        assert_eq!(calls[0].arguments, r#"{"workflow_type":"quiz"}"#);
    }

    #[test]
    fn empty_tool_calls_fall_back_to_text() {
        let body = r#"{"choices":[{"message":{"content":"hi","tool_calls":[]}}]}"#;
        assert!(decode_response(body).unwrap().first_tool_call().is_none());
    }

    #[test]
    fn missing_choice_or_garbage_is_a_parse_error() {
        for body in [r#"{"choices":[]}"#, "not json"] {
            assert!(matches!(
                decode_response(body),
                Err(LlmError::ParseFailed { .. })
            ));
        }
    }
}
