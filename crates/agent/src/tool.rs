use async_trait::async_trait;
use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use taskdeck_llm::ToolDefinition;
use taskdeck_store::StoreError;

/// Context passed to tool execution. Every tool runs on behalf of one
/// authenticated user; rows owned by other users are invisible.
#[derive(Clone)]
pub struct ToolContext {
    pub pool: PgPool,
    pub user_id: Uuid,
}

/// The primary extension point: all tools implement this trait.
///
/// Tools are object-safe, Send + Sync, and async. `execute` returns the JSON
/// payload reported back to the model; the loop serializes it into a tool
/// result.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Returns the tool's definition (name, description, JSON Schema).
    fn definition(&self) -> ToolDefinition;

    /// Execute the tool with the given JSON input.
    async fn execute(&self, input: Value, context: &ToolContext) -> Result<Value, ToolError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("execution failed: {0}")]
    ExecutionFailed(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Pull a required string field out of tool input.
pub(crate) fn require_str<'a>(input: &'a Value, field: &str) -> Result<&'a str, ToolError> {
    input
        .get(field)
        .and_then(|v| v.as_str())
        .ok_or_else(|| ToolError::InvalidInput(format!("missing '{}' field", field)))
}

/// Parse a required UUID field out of tool input.
pub(crate) fn require_uuid(input: &Value, field: &str) -> Result<Uuid, ToolError> {
    let raw = require_str(input, field)?;
    raw.parse()
        .map_err(|_| ToolError::InvalidInput(format!("'{}' is not a valid UUID: {}", field, raw)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn require_str_missing_field() {
        let err = require_str(&json!({}), "title").unwrap_err();
        assert!(matches!(err, ToolError::InvalidInput(_)));
    }

    #[test]
    fn require_uuid_rejects_garbage() {
        let err = require_uuid(&json!({"task_id": "not-a-uuid"}), "task_id").unwrap_err();
        assert!(matches!(err, ToolError::InvalidInput(_)));
    }

    #[test]
    fn require_uuid_accepts_valid() {
        let id = Uuid::new_v4();
        let parsed = require_uuid(&json!({"task_id": id.to_string()}), "task_id").unwrap();
        assert_eq!(parsed, id);
    }
}
