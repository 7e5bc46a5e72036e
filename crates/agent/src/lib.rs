//! Tool runtime for the chat agent: the `Tool` trait, the registry of the
//! five task tools, and the loop that orchestrates LLM ↔ tool execution.

pub mod prompt;
pub mod registry;
pub mod runtime;
pub mod tool;
pub mod tools;

pub use prompt::SYSTEM_PROMPT;
pub use registry::{RegistryError, ToolRegistry};
pub use runtime::{AgentError, AgentLoop, AgentReply};
pub use tool::{Tool, ToolContext, ToolError};
pub use tools::register_task_tools;
