use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::info;

use taskdeck_llm::ToolDefinition;
use taskdeck_store::tasks;
use taskdeck_store::tasks::TaskPatch;

use super::status_str;
use crate::tool::{require_str, require_uuid, Tool, ToolContext, ToolError};

/// Set a task's status to completed or pending.
pub struct UpdateTaskStatusTool;

#[async_trait]
impl Tool for UpdateTaskStatusTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "update_task_status".to_string(),
            description: "Update a task's status to completed or pending".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "task_id": {
                        "type": "string",
                        "description": "The UUID of the task to update"
                    },
                    "status": {
                        "type": "string",
                        "enum": ["completed", "pending"],
                        "description": "The new status for the task"
                    }
                },
                "required": ["task_id", "status"]
            }),
        }
    }

    async fn execute(&self, input: Value, context: &ToolContext) -> Result<Value, ToolError> {
        let task_id = require_uuid(&input, "task_id")?;
        let status = require_str(&input, "status")?;
        let completed = match status {
            "completed" => true,
            "pending" => false,
            other => {
                return Err(ToolError::InvalidInput(format!(
                    "unknown status '{}', expected 'completed' or 'pending'",
                    other
                )))
            }
        };

        // Fetch first so the old status can be reported.
        let before = tasks::get(&context.pool, task_id, context.user_id).await?;
        let old_status = status_str(before.completed);

        let patch = TaskPatch {
            completed: Some(completed),
            ..TaskPatch::default()
        };
        let task = tasks::update(&context.pool, task_id, context.user_id, patch).await?;
        info!(
            tool = "update_task_status",
            task_id = %task_id,
            user_id = %context.user_id,
            old_status,
            new_status = status,
            "tool executed"
        );

        Ok(json!({
            "success": true,
            "task_id": task_id.to_string(),
            "title": task.title,
            "old_status": old_status,
            "new_status": status,
            "message": format!("Marked '{}' as {}", task.title, status),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::test_support::offline_context;

    #[test]
    fn definition_requires_both_fields() {
        let def = UpdateTaskStatusTool.definition();
        assert_eq!(def.name, "update_task_status");
        let required = def.input_schema["required"].as_array().unwrap().clone();
        assert_eq!(required, vec![json!("task_id"), json!("status")]);
    }

    #[tokio::test]
    async fn invalid_uuid_is_rejected_before_db_access() {
        let err = UpdateTaskStatusTool
            .execute(
                json!({"task_id": "42", "status": "completed"}),
                &offline_context(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn unknown_status_is_rejected_before_db_access() {
        let err = UpdateTaskStatusTool
            .execute(
                json!({
                    "task_id": uuid::Uuid::new_v4().to_string(),
                    "status": "archived"
                }),
                &offline_context(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::InvalidInput(_)));
    }
}
