//! Claude (Anthropic Messages API) implementation of [`ToolAwareLlmProvider`].
//!
//! Translates between the provider-agnostic [`ChatMessage`] types and the
//! Anthropic content-block format (`tool_use` assistant blocks, `tool_result`
//! user blocks).

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::provider::{
    ChatMessage, CompletionResponse, LlmError, StopReason, ToolAwareLlmProvider, ToolCall,
    ToolDefinition,
};

const ANTHROPIC_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Attempts per request: the first call plus one retry on transient failures.
const MAX_ATTEMPTS: u32 = 2;
const RETRY_BACKOFF_SECS: u64 = 1;

pub struct ClaudeProvider {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl ClaudeProvider {
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            model,
            base_url: ANTHROPIC_URL.to_string(),
        }
    }

    /// Override the endpoint (proxies, test servers).
    pub fn with_base_url(mut self, url: String) -> Self {
        self.base_url = url;
        self
    }

    async fn request_once(&self, body: &Value) -> Result<CompletionResponse, LlmError> {
        debug!(model = %self.model, "claude request");

        let response = self
            .client
            .post(&self.base_url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("Content-Type", "application/json")
            .json(body)
            .send()
            .await?;

        let status = response.status().as_u16();
        if status == 401 || status == 403 {
            return Err(LlmError::Auth);
        }
        if status == 429 {
            return Err(LlmError::RateLimited);
        }
        if status != 200 {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Api { status, body });
        }

        let resp: Value = response.json().await?;
        parse_response(&resp)
    }
}

#[async_trait]
impl ToolAwareLlmProvider for ClaudeProvider {
    async fn complete_with_tools(
        &self,
        messages: Vec<ChatMessage>,
        system_prompt: Option<String>,
        tools: Vec<ToolDefinition>,
        max_tokens: u32,
    ) -> Result<CompletionResponse, LlmError> {
        let body = build_request_body(&self.model, &messages, system_prompt.as_deref(), &tools, max_tokens);

        let mut last_err = None;
        for attempt in 0..MAX_ATTEMPTS {
            match self.request_once(&body).await {
                Ok(resp) => return Ok(resp),
                Err(e) if e.is_retryable() && attempt + 1 < MAX_ATTEMPTS => {
                    warn!(attempt, error = %e, "claude request failed, retrying");
                    tokio::time::sleep(std::time::Duration::from_secs(RETRY_BACKOFF_SECS)).await;
                    last_err = Some(e);
                }
                Err(e) => return Err(e),
            }
        }
        Err(last_err.unwrap_or(LlmError::InvalidResponse("no attempts made".into())))
    }

    fn provider_name(&self) -> &str {
        "claude"
    }
}

// ── Translation ───────────────────────────────────────────────

fn build_request_body(
    model: &str,
    messages: &[ChatMessage],
    system_prompt: Option<&str>,
    tools: &[ToolDefinition],
    max_tokens: u32,
) -> Value {
    let api_messages: Vec<Value> = messages.iter().map(message_to_claude).collect();

    let mut body = json!({
        "model": model,
        "messages": api_messages,
        "max_tokens": max_tokens,
    });

    if let Some(system) = system_prompt {
        body["system"] = json!(system);
    }
    if !tools.is_empty() {
        let tool_defs: Vec<Value> = tools.iter().map(tool_definition_to_claude).collect();
        body["tools"] = json!(tool_defs);
    }
    body
}

fn tool_definition_to_claude(tool: &ToolDefinition) -> Value {
    json!({
        "name": tool.name,
        "description": tool.description,
        "input_schema": tool.input_schema,
    })
}

fn message_to_claude(msg: &ChatMessage) -> Value {
    match msg {
        ChatMessage::User(text) => json!({
            "role": "user",
            "content": text,
        }),
        ChatMessage::Assistant { text, tool_calls } => {
            let mut blocks: Vec<Value> = Vec::new();
            if let Some(text) = text {
                blocks.push(json!({"type": "text", "text": text}));
            }
            for tc in tool_calls {
                blocks.push(json!({
                    "type": "tool_use",
                    "id": tc.id,
                    "name": tc.name,
                    "input": tc.input,
                }));
            }
            json!({
                "role": "assistant",
                "content": blocks,
            })
        }
        ChatMessage::ToolResult(result) => json!({
            "role": "user",
            "content": [{
                "type": "tool_result",
                "tool_use_id": result.tool_call_id,
                "content": result.content,
                "is_error": result.is_error,
            }],
        }),
    }
}

fn parse_response(resp: &Value) -> Result<CompletionResponse, LlmError> {
    let blocks = resp["content"]
        .as_array()
        .ok_or_else(|| LlmError::InvalidResponse("missing content array".into()))?;

    let mut text_parts: Vec<&str> = Vec::new();
    let mut tool_calls = Vec::new();

    for block in blocks {
        match block["type"].as_str() {
            Some("text") => {
                if let Some(t) = block["text"].as_str() {
                    text_parts.push(t);
                }
            }
            Some("tool_use") => {
                let id = block["id"]
                    .as_str()
                    .ok_or_else(|| LlmError::InvalidResponse("tool_use block missing id".into()))?;
                let name = block["name"].as_str().ok_or_else(|| {
                    LlmError::InvalidResponse("tool_use block missing name".into())
                })?;
                tool_calls.push(ToolCall {
                    id: id.to_string(),
                    name: name.to_string(),
                    input: block["input"].clone(),
                });
            }
            _ => {}
        }
    }

    let stop_reason = match resp["stop_reason"].as_str() {
        Some("tool_use") => StopReason::ToolUse,
        Some("max_tokens") => StopReason::MaxTokens,
        _ => StopReason::EndTurn,
    };

    let text = if text_parts.is_empty() {
        None
    } else {
        Some(text_parts.join(""))
    };

    Ok(CompletionResponse {
        text,
        tool_calls,
        stop_reason,
    })
}
