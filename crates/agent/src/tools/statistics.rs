use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::info;

use taskdeck_llm::ToolDefinition;
use taskdeck_store::tasks;

use crate::tool::{Tool, ToolContext, ToolError};

/// Productivity statistics over the user's active tasks.
pub struct TaskStatisticsTool;

#[async_trait]
impl Tool for TaskStatisticsTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "get_task_statistics".to_string(),
            description:
                "Get productivity statistics including total tasks, completion rate, and daily progress"
                    .to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {},
                "required": []
            }),
        }
    }

    async fn execute(&self, _input: Value, context: &ToolContext) -> Result<Value, ToolError> {
        let stats = tasks::statistics(&context.pool, context.user_id).await?;
        info!(
            tool = "get_task_statistics",
            user_id = %context.user_id,
            total = stats.total_tasks,
            completion_rate = stats.completion_rate,
            "tool executed"
        );

        let message = format!(
            "You have {} pending tasks and have completed {} ({}% completion rate)",
            stats.pending_tasks, stats.completed_tasks, stats.completion_rate
        );

        Ok(json!({
            "success": true,
            "statistics": {
                "total_tasks": stats.total_tasks,
                "pending_tasks": stats.pending_tasks,
                "completed_tasks": stats.completed_tasks,
                "completion_rate": stats.completion_rate,
                "tasks_created_today": stats.tasks_created_today,
                "tasks_completed_today": stats.tasks_completed_today,
                "streak_days": stats.streak_days,
            },
            "message": message,
        }))
    }
}
