use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Describes a tool's interface for LLM consumption (Claude tool format).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Unique tool name (e.g., "add_task")
    pub name: String,
    /// Human-readable description for the LLM
    pub description: String,
    /// JSON Schema describing the expected input
    pub input_schema: Value,
}

/// An LLM requesting execution of a tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    /// Unique ID for this invocation (used to match results)
    pub id: String,
    /// Tool name to execute
    pub name: String,
    /// JSON input arguments
    pub input: Value,
}

/// Result of executing a tool, sent back to the LLM.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResultPayload {
    /// Must match the ToolCall id
    pub tool_call_id: String,
    /// Result content (JSON-encoded text)
    pub content: String,
    /// Whether this result represents an error
    pub is_error: bool,
}

/// A message in the conversation sent to the provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ChatMessage {
    /// User's text input
    User(String),
    /// Assistant's response (may contain text and/or tool calls)
    Assistant {
        text: Option<String>,
        tool_calls: Vec<ToolCall>,
    },
    /// Result of a tool execution
    ToolResult(ToolResultPayload),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StopReason {
    EndTurn,
    ToolUse,
    MaxTokens,
}

/// A complete (non-streaming) model response.
#[derive(Debug, Clone)]
pub struct CompletionResponse {
    pub text: Option<String>,
    pub tool_calls: Vec<ToolCall>,
    pub stop_reason: StopReason,
}

impl CompletionResponse {
    /// True when the model is asking for tool executions before finishing.
    pub fn wants_tools(&self) -> bool {
        self.stop_reason == StopReason::ToolUse && !self.tool_calls.is_empty()
    }
}

/// Trait for LLM providers that support tool use.
///
/// Defined by the consumer (the agent loop); implementations live in
/// `providers`.
#[async_trait]
pub trait ToolAwareLlmProvider: Send + Sync {
    /// Run one completion with tool definitions available.
    async fn complete_with_tools(
        &self,
        messages: Vec<ChatMessage>,
        system_prompt: Option<String>,
        tools: Vec<ToolDefinition>,
        max_tokens: u32,
    ) -> Result<CompletionResponse, LlmError>;

    /// Provider name for logging (e.g., "claude")
    fn provider_name(&self) -> &str;
}

#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("API error: {status} - {body}")]
    Api { status: u16, body: String },
    #[error("network error: {0}")]
    Network(String),
    #[error("invalid response: {0}")]
    InvalidResponse(String),
    #[error("rate limited")]
    RateLimited,
    #[error("authentication failed")]
    Auth,
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<reqwest::Error> for LlmError {
    fn from(e: reqwest::Error) -> Self {
        LlmError::Network(e.to_string())
    }
}

impl LlmError {
    /// Transport failures, rate limits, and server errors are worth one retry.
    pub fn is_retryable(&self) -> bool {
        match self {
            LlmError::Network(_) | LlmError::RateLimited => true,
            LlmError::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

/// Mock LLM provider for testing the agent loop without real API calls.
#[cfg(any(test, feature = "test-utils"))]
pub mod mock {
    use super::*;
    use std::sync::Mutex;

    /// Returns pre-queued responses in FIFO order.
    pub struct MockProvider {
        responses: Mutex<Vec<CompletionResponse>>,
    }

    impl MockProvider {
        pub fn new() -> Self {
            Self {
                responses: Mutex::new(Vec::new()),
            }
        }

        /// Queue a response for the next call.
        pub fn queue_response(&self, response: CompletionResponse) {
            self.responses.lock().unwrap().push(response);
        }

        /// Queue a plain text response.
        pub fn queue_text(&self, text: &str) {
            self.queue_response(CompletionResponse {
                text: Some(text.to_string()),
                tool_calls: vec![],
                stop_reason: StopReason::EndTurn,
            });
        }

        /// Queue a tool-use response.
        pub fn queue_tool_call(&self, id: &str, name: &str, input: Value) {
            self.queue_response(CompletionResponse {
                text: None,
                tool_calls: vec![ToolCall {
                    id: id.to_string(),
                    name: name.to_string(),
                    input,
                }],
                stop_reason: StopReason::ToolUse,
            });
        }
    }

    impl Default for MockProvider {
        fn default() -> Self {
            Self::new()
        }
    }

    #[async_trait]
    impl ToolAwareLlmProvider for MockProvider {
        async fn complete_with_tools(
            &self,
            _messages: Vec<ChatMessage>,
            _system_prompt: Option<String>,
            _tools: Vec<ToolDefinition>,
            _max_tokens: u32,
        ) -> Result<CompletionResponse, LlmError> {
            let mut responses = self.responses.lock().unwrap();
            if responses.is_empty() {
                return Ok(CompletionResponse {
                    text: None,
                    tool_calls: vec![],
                    stop_reason: StopReason::EndTurn,
                });
            }
            Ok(responses.remove(0))
        }

        fn provider_name(&self) -> &str {
            "mock"
        }
    }
}
