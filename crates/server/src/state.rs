use sqlx::PgPool;

use taskdeck_agent::AgentLoop;
use taskdeck_core::Config;

/// Shared application state.
///
/// `agent` is `None` when no LLM API key is configured; the chat endpoint
/// then serves a static fallback reply instead of failing.
pub struct AppState {
    pub pool: PgPool,
    pub config: Config,
    pub agent: Option<AgentLoop>,
}
