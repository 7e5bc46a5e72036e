use std::sync::Arc;

use serde_json::json;
use tracing::{debug, info, warn};

use taskdeck_llm::{
    ChatMessage, LlmError, ToolAwareLlmProvider, ToolCall, ToolResultPayload,
};

use crate::registry::ToolRegistry;
use crate::tool::ToolContext;

/// The agentic loop that orchestrates LLM ↔ tool execution.
///
/// Flow: history + user message → LLM → tool calls → execute → results → LLM
/// → ... → final text.
pub struct AgentLoop {
    provider: Arc<dyn ToolAwareLlmProvider>,
    registry: Arc<ToolRegistry>,
    system_prompt: String,
    max_iterations: u32,
    max_tokens: u32,
}

/// Outcome of one user turn.
#[derive(Debug, Clone)]
pub struct AgentReply {
    pub text: String,
    /// Tool names in execution order, duplicates preserved.
    pub tools_used: Vec<String>,
}

impl AgentLoop {
    pub fn new(
        provider: Arc<dyn ToolAwareLlmProvider>,
        registry: Arc<ToolRegistry>,
        system_prompt: String,
    ) -> Self {
        Self {
            provider,
            registry,
            system_prompt,
            max_iterations: 10,
            max_tokens: 2048,
        }
    }

    pub fn with_max_iterations(mut self, max: u32) -> Self {
        self.max_iterations = max;
        self
    }

    pub fn with_max_tokens(mut self, max: u32) -> Self {
        self.max_tokens = max;
        self
    }

    pub fn provider_name(&self) -> &str {
        self.provider.provider_name()
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Run a single user turn through the loop.
    ///
    /// `history` is the persisted conversation so far (chronological); the
    /// current user message is appended here, not by the caller.
    pub async fn run(
        &self,
        history: Vec<ChatMessage>,
        user_message: String,
        context: &ToolContext,
    ) -> Result<AgentReply, AgentError> {
        let mut messages = history;
        messages.push(ChatMessage::User(user_message));

        let mut tools_used = Vec::new();

        for iteration in 0..self.max_iterations {
            debug!(iteration, "agent loop iteration");

            let response = self
                .provider
                .complete_with_tools(
                    messages.clone(),
                    Some(self.system_prompt.clone()),
                    self.registry.definitions(),
                    self.max_tokens,
                )
                .await?;

            let wants_tools = response.wants_tools();
            messages.push(ChatMessage::Assistant {
                text: response.text.clone(),
                tool_calls: response.tool_calls.clone(),
            });

            if !wants_tools {
                info!(
                    iteration,
                    tools_used = tools_used.len(),
                    "agent loop complete"
                );
                return Ok(AgentReply {
                    text: response.text.unwrap_or_default(),
                    tools_used,
                });
            }

            for call in &response.tool_calls {
                tools_used.push(call.name.clone());
                let result = self.execute_tool_call(call, context).await;
                messages.push(ChatMessage::ToolResult(result));
            }
        }

        warn!(max = self.max_iterations, "agent loop hit iteration cap");
        Err(AgentError::MaxIterations(self.max_iterations))
    }

    /// Execute one call; failures become error tool results, not loop errors,
    /// so the model can recover or apologize.
    async fn execute_tool_call(&self, call: &ToolCall, context: &ToolContext) -> ToolResultPayload {
        info!(tool = %call.name, "executing tool call");

        let Some(tool) = self.registry.get(&call.name) else {
            warn!(tool = %call.name, "unknown tool requested");
            return error_result(&call.id, &format!("Unknown tool: {}", call.name));
        };

        match tool.execute(call.input.clone(), context).await {
            Ok(payload) => ToolResultPayload {
                tool_call_id: call.id.clone(),
                content: payload.to_string(),
                is_error: false,
            },
            Err(e) => {
                warn!(tool = %call.name, error = %e, "tool execution failed");
                error_result(&call.id, &e.to_string())
            }
        }
    }
}

fn error_result(tool_call_id: &str, message: &str) -> ToolResultPayload {
    let payload = json!({
        "success": false,
        "error": message,
    });
    ToolResultPayload {
        tool_call_id: tool_call_id.to_string(),
        content: payload.to_string(),
        is_error: true,
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),
    #[error("max iterations ({0}) exceeded")]
    MaxIterations(u32),
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use taskdeck_llm::provider::mock::MockProvider;
    use taskdeck_llm::ToolDefinition;

    use crate::tool::{Tool, ToolContext, ToolError};
    use crate::tools::test_support::offline_context;

    /// DB-free tool: echoes its input back, never touches the pool.
    struct EchoTool;

    #[async_trait]
    impl Tool for EchoTool {
        fn definition(&self) -> ToolDefinition {
            ToolDefinition {
                name: "echo".to_string(),
                description: "Echoes back the input message.".to_string(),
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "message": {"type": "string"}
                    },
                    "required": ["message"]
                }),
            }
        }

        async fn execute(&self, input: Value, _context: &ToolContext) -> Result<Value, ToolError> {
            let message = input
                .get("message")
                .and_then(|v| v.as_str())
                .ok_or_else(|| ToolError::InvalidInput("missing 'message' field".to_string()))?;
            Ok(json!({"success": true, "echo": message}))
        }
    }

    fn setup_loop() -> (AgentLoop, Arc<MockProvider>) {
        let provider = Arc::new(MockProvider::new());
        let mut registry = ToolRegistry::new();
        registry.register(EchoTool).unwrap();

        let agent = AgentLoop::new(
            provider.clone() as Arc<dyn ToolAwareLlmProvider>,
            Arc::new(registry),
            "You are a test assistant.".to_string(),
        );
        (agent, provider)
    }

    #[tokio::test]
    async fn plain_text_turn() {
        let (agent, provider) = setup_loop();
        provider.queue_text("Hello, I'm an assistant!");

        let reply = agent
            .run(vec![], "Hello".to_string(), &offline_context())
            .await
            .unwrap();

        assert_eq!(reply.text, "Hello, I'm an assistant!");
        assert!(reply.tools_used.is_empty());
    }

    #[tokio::test]
    async fn tool_call_then_final_text() {
        let (agent, provider) = setup_loop();
        provider.queue_tool_call("call_1", "echo", json!({"message": "test"}));
        provider.queue_text("Done!");

        let reply = agent
            .run(vec![], "Echo test".to_string(), &offline_context())
            .await
            .unwrap();

        assert_eq!(reply.text, "Done!");
        assert_eq!(reply.tools_used, vec!["echo"]);
    }

    #[tokio::test]
    async fn unknown_tool_becomes_error_result_and_loop_continues() {
        let (agent, provider) = setup_loop();
        provider.queue_tool_call("call_1", "no_such_tool", json!({}));
        provider.queue_text("Sorry, that didn't work.");

        let reply = agent
            .run(vec![], "Do something".to_string(), &offline_context())
            .await
            .unwrap();

        assert_eq!(reply.text, "Sorry, that didn't work.");
        assert_eq!(reply.tools_used, vec!["no_such_tool"]);
    }

    #[tokio::test]
    async fn tool_input_error_becomes_error_result() {
        let (agent, provider) = setup_loop();
        // Echo without its required field
        provider.queue_tool_call("call_1", "echo", json!({}));
        provider.queue_text("Let me try again differently.");

        let reply = agent
            .run(vec![], "Echo nothing".to_string(), &offline_context())
            .await
            .unwrap();

        assert_eq!(reply.text, "Let me try again differently.");
    }

    #[tokio::test]
    async fn iteration_cap_is_an_error() {
        let (agent, provider) = setup_loop();
        let agent = agent.with_max_iterations(3);
        for i in 0..3 {
            provider.queue_tool_call(&format!("call_{}", i), "echo", json!({"message": "again"}));
        }

        let err = agent
            .run(vec![], "Loop forever".to_string(), &offline_context())
            .await
            .unwrap_err();

        assert!(matches!(err, AgentError::MaxIterations(3)));
    }

    #[tokio::test]
    async fn history_is_preserved_ahead_of_new_message() {
        let (agent, provider) = setup_loop();
        provider.queue_text("I remember.");

        let history = vec![
            ChatMessage::User("Earlier message".to_string()),
            ChatMessage::Assistant {
                text: Some("Earlier reply".to_string()),
                tool_calls: vec![],
            },
        ];
        let reply = agent
            .run(history, "Do you remember?".to_string(), &offline_context())
            .await
            .unwrap();
        assert_eq!(reply.text, "I remember.");
    }
}
