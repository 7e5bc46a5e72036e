//! Application configuration builders.
//!
//! Constructs the chat agent subsystem from `Config`. The server runs
//! without it; chat endpoints degrade to a fallback reply.

use std::sync::Arc;

use tracing::{info, warn};

use taskdeck_agent::{register_task_tools, AgentLoop, ToolRegistry, SYSTEM_PROMPT};
use taskdeck_core::Config;
use taskdeck_llm::providers::create_provider;

/// Load configuration from `.env` and environment variables.
pub fn load_config() -> Config {
    taskdeck_core::config::load_dotenv();
    Config::from_env()
}

/// Build the chat agent from config, or `None` when no provider is
/// configured.
pub fn build_agent(config: &Config) -> Option<AgentLoop> {
    let provider = match create_provider(&config.llm) {
        Ok(provider) => provider,
        Err(e) => {
            warn!("LLM provider unavailable: {} — chat assistant disabled", e);
            return None;
        }
    };

    let mut registry = ToolRegistry::new();
    if let Err(e) = register_task_tools(&mut registry) {
        warn!("Tool registration failed: {} — chat assistant disabled", e);
        return None;
    }

    info!(
        provider = provider.provider_name(),
        tools = registry.len(),
        "chat assistant ready"
    );

    Some(
        AgentLoop::new(provider, Arc::new(registry), SYSTEM_PROMPT.to_string())
            .with_max_iterations(config.llm.max_tool_iterations)
            .with_max_tokens(config.llm.max_tokens),
    )
}
