//! LLM provider abstraction: provider-agnostic chat/tool types and the
//! Anthropic Messages API implementation with tool use.

pub mod provider;
pub mod providers;

pub use provider::{
    ChatMessage, CompletionResponse, LlmError, StopReason, ToolAwareLlmProvider, ToolCall,
    ToolDefinition, ToolResultPayload,
};
pub use providers::claude::ClaudeProvider;
