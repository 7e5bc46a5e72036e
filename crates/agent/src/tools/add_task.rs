use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::info;

use taskdeck_llm::ToolDefinition;
use taskdeck_store::tasks;

use super::status_str;
use crate::tool::{require_str, Tool, ToolContext, ToolError};

/// Create a new task for the user.
pub struct AddTaskTool;

#[async_trait]
impl Tool for AddTaskTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "add_task".to_string(),
            description: "Create a new task with a title and optional description".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "title": {
                        "type": "string",
                        "description": "The task title (required)"
                    },
                    "description": {
                        "type": "string",
                        "description": "Optional task description or details"
                    }
                },
                "required": ["title"]
            }),
        }
    }

    async fn execute(&self, input: Value, context: &ToolContext) -> Result<Value, ToolError> {
        let title = require_str(&input, "title")?;
        let description = input.get("description").and_then(|v| v.as_str());

        let task = tasks::create(&context.pool, context.user_id, title, description).await?;
        info!(tool = "add_task", task_id = %task.id, user_id = %context.user_id, "tool executed");

        Ok(json!({
            "success": true,
            "task_id": task.id.to_string(),
            "title": task.title,
            "description": task.description.unwrap_or_default(),
            "status": status_str(task.completed),
            "created_at": task.created_at.to_rfc3339(),
            "message": format!("Created task: {}", task.title),
        }))
    }
}
