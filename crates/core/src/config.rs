use std::env;

use serde::{Deserialize, Serialize};

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

fn env_u16(key: &str, default: u16) -> u16 {
    env_opt(key).and_then(|v| v.parse().ok()).unwrap_or(default)
}

fn env_u32(key: &str, default: u32) -> u32 {
    env_opt(key).and_then(|v| v.parse().ok()).unwrap_or(default)
}

// ── Top-level config ──────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub postgres: PostgresConfig,
    pub auth: AuthConfig,
    pub llm: LlmConfig,
}

impl Config {
    /// Build config from environment variables (call `load_dotenv()` first).
    pub fn from_env() -> Self {
        Self {
            server: ServerConfig::from_env(),
            postgres: PostgresConfig::from_env(),
            auth: AuthConfig::from_env(),
            llm: LlmConfig::from_env(),
        }
    }

    /// Log the effective configuration with secrets redacted.
    pub fn log_summary(&self) {
        tracing::info!("Configuration:");
        tracing::info!("  server: {}:{}", self.server.host, self.server.port);
        tracing::info!("  allowed origins: {:?}", self.server.allowed_origins);
        tracing::info!(
            "  database: {}",
            if self.postgres.url.is_empty() { "not configured" } else { "configured" }
        );
        tracing::info!(
            "  jwt secret: {}",
            if self.auth.jwt_secret.is_empty() { "MISSING" } else { "set (redacted)" }
        );
        tracing::info!("  jwt expiration: {}h", self.auth.jwt_expiration_hours);
        tracing::info!(
            "  llm: {} ({})",
            self.llm.model,
            if self.llm.anthropic_api_key.is_some() { "api key set" } else { "no api key — chat degraded" }
        );
    }
}

// ── Server ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// CORS origins allowed to send credentialed requests.
    pub allowed_origins: Vec<String>,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self {
            host: env_or("HOST", "0.0.0.0"),
            port: env_u16("PORT", 8000),
            allowed_origins: parse_origins(&env_or("ALLOWED_ORIGINS", "http://localhost:3000")),
        }
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

// ── Postgres ──────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostgresConfig {
    /// Full connection string. Empty = database not configured.
    pub url: String,
}

impl PostgresConfig {
    pub fn from_env() -> Self {
        Self {
            url: env_or("DATABASE_URL", ""),
        }
    }
}

// ── Auth ──────────────────────────────────────────────────────

/// Minimum secret length for HS256 signing.
pub const MIN_JWT_SECRET_LEN: usize = 32;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub jwt_expiration_hours: u32,
    /// Lifetime of the `access_token` cookie, in seconds.
    pub cookie_max_age_secs: u64,
}

impl AuthConfig {
    pub fn from_env() -> Self {
        Self {
            jwt_secret: env_or("JWT_SECRET", ""),
            jwt_expiration_hours: env_u32("JWT_EXPIRATION_HOURS", 24).clamp(1, 168),
            cookie_max_age_secs: 60 * 60 * 24 * 7,
        }
    }

    /// A secret shorter than 32 bytes is treated as unset.
    pub fn secret_is_usable(&self) -> bool {
        self.jwt_secret.len() >= MIN_JWT_SECRET_LEN
    }
}

// ── LLM ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    pub anthropic_api_key: Option<String>,
    pub model: String,
    pub max_tokens: u32,
    /// Cap on LLM round-trips per chat turn.
    pub max_tool_iterations: u32,
}

impl LlmConfig {
    pub fn from_env() -> Self {
        // Placeholder keys from .env templates count as unset.
        let api_key = env_opt("ANTHROPIC_API_KEY").filter(|k| !k.starts_with("sk-ant-api03-xxx"));
        Self {
            anthropic_api_key: api_key,
            model: env_or("ANTHROPIC_MODEL", "claude-3-5-sonnet-20241022"),
            max_tokens: env_u32("ANTHROPIC_MAX_TOKENS", 2048),
            max_tool_iterations: env_u32("LLM_MAX_TOOL_ITERATIONS", 10),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_origins_splits_and_trims() {
        let origins = parse_origins("http://localhost:3000, https://app.example.com ,");
        assert_eq!(
            origins,
            vec!["http://localhost:3000", "https://app.example.com"]
        );
    }

    #[test]
    fn parse_origins_empty_input() {
        assert!(parse_origins("").is_empty());
    }

    #[test]
    fn secret_length_gate() {
        let mut auth = AuthConfig {
            jwt_secret: "short".into(),
            jwt_expiration_hours: 24,
            cookie_max_age_secs: 0,
        };
        assert!(!auth.secret_is_usable());
        auth.jwt_secret = "x".repeat(MIN_JWT_SECRET_LEN);
        assert!(auth.secret_is_usable());
    }

    #[test]
    fn expiration_hours_clamped() {
        // from_env clamps to 1..=168; exercise the same clamp directly
        assert_eq!(0u32.clamp(1, 168), 1);
        assert_eq!(500u32.clamp(1, 168), 168);
    }
}
