use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::info;

use taskdeck_llm::ToolDefinition;
use taskdeck_store::tasks;

use super::status_str;
use crate::tool::{Tool, ToolContext, ToolError};

/// List the user's tasks, optionally filtered by status.
pub struct GetTasksTool;

#[async_trait]
impl Tool for GetTasksTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "get_tasks".to_string(),
            description: "Get all tasks, optionally filtered by status (pending or completed)"
                .to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "status": {
                        "type": "string",
                        "enum": ["pending", "completed"],
                        "description": "Filter tasks by status. Omit to get all tasks."
                    }
                },
                "required": []
            }),
        }
    }

    async fn execute(&self, input: Value, context: &ToolContext) -> Result<Value, ToolError> {
        let status = input.get("status").and_then(|v| v.as_str());
        let completed = match status {
            None => None,
            Some("completed") => Some(true),
            Some("pending") => Some(false),
            Some(other) => {
                return Err(ToolError::InvalidInput(format!(
                    "unknown status '{}', expected 'pending' or 'completed'",
                    other
                )))
            }
        };

        let tasks =
            tasks::list(&context.pool, context.user_id, 0, tasks::MAX_PAGE_SIZE, completed).await?;
        info!(
            tool = "get_tasks",
            user_id = %context.user_id,
            count = tasks.len(),
            filter = status.unwrap_or("all"),
            "tool executed"
        );

        let task_list: Vec<Value> = tasks
            .iter()
            .map(|t| {
                let mut entry = json!({
                    "id": t.id.to_string(),
                    "title": t.title,
                    "description": t.description.clone().unwrap_or_default(),
                    "status": status_str(t.completed),
                    "created_at": t.created_at.to_rfc3339(),
                    "updated_at": t.updated_at.to_rfc3339(),
                });
                if t.completed {
                    entry["completed_at"] = json!(t.updated_at.to_rfc3339());
                }
                entry
            })
            .collect();

        Ok(json!({
            "success": true,
            "count": task_list.len(),
            "tasks": task_list,
            "filter": status.unwrap_or("all"),
        }))
    }
}
