use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::info;

use taskdeck_llm::ToolDefinition;
use taskdeck_store::tasks;

use crate::tool::{require_uuid, Tool, ToolContext, ToolError};

/// Soft-delete a task.
pub struct DeleteTaskTool;

#[async_trait]
impl Tool for DeleteTaskTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "delete_task".to_string(),
            description: "Delete a task".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "task_id": {
                        "type": "string",
                        "description": "The UUID of the task to delete"
                    }
                },
                "required": ["task_id"]
            }),
        }
    }

    async fn execute(&self, input: Value, context: &ToolContext) -> Result<Value, ToolError> {
        let task_id = require_uuid(&input, "task_id")?;

        // Capture the title for the confirmation message before the delete.
        let task = tasks::get(&context.pool, task_id, context.user_id).await?;
        tasks::soft_delete(&context.pool, task_id, context.user_id).await?;
        info!(tool = "delete_task", task_id = %task_id, user_id = %context.user_id, "tool executed");

        Ok(json!({
            "success": true,
            "task_id": task_id.to_string(),
            "title": task.title,
            "message": format!("Deleted task: {}", task.title),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::test_support::offline_context;

    #[test]
    fn definition_requires_task_id() {
        let def = DeleteTaskTool.definition();
        assert_eq!(def.name, "delete_task");
        assert_eq!(def.input_schema["required"][0], "task_id");
    }

    #[tokio::test]
    async fn missing_task_id_is_invalid_input() {
        let err = DeleteTaskTool
            .execute(json!({}), &offline_context())
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::InvalidInput(_)));
    }
}
