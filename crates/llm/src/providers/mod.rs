pub mod claude;

use std::sync::Arc;

use taskdeck_core::config::LlmConfig;

use crate::provider::{LlmError, ToolAwareLlmProvider};
use crate::providers::claude::ClaudeProvider;

/// Build the configured provider. Errors when no API key is set.
pub fn create_provider(config: &LlmConfig) -> Result<Arc<dyn ToolAwareLlmProvider>, LlmError> {
    let api_key = config
        .anthropic_api_key
        .clone()
        .ok_or(LlmError::Auth)?;
    Ok(Arc::new(ClaudeProvider::new(api_key, config.model.clone())))
}
