//! The five task tools exposed to the chat agent.

mod add_task;
mod delete_task;
mod get_tasks;
mod statistics;
mod update_status;

pub use add_task::AddTaskTool;
pub use delete_task::DeleteTaskTool;
pub use get_tasks::GetTasksTool;
pub use statistics::TaskStatisticsTool;
pub use update_status::UpdateTaskStatusTool;

use crate::registry::{RegistryError, ToolRegistry};

/// Register the full task tool set.
pub fn register_task_tools(registry: &mut ToolRegistry) -> Result<(), RegistryError> {
    registry.register(AddTaskTool)?;
    registry.register(GetTasksTool)?;
    registry.register(UpdateTaskStatusTool)?;
    registry.register(DeleteTaskTool)?;
    registry.register(TaskStatisticsTool)?;
    Ok(())
}

/// Render a task's completion flag the way the tool protocol expects.
pub(crate) fn status_str(completed: bool) -> &'static str {
    if completed {
        "completed"
    } else {
        "pending"
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_tool_set_registers_five_tools() {
        let mut registry = ToolRegistry::new();
        register_task_tools(&mut registry).unwrap();
        assert_eq!(registry.len(), 5);
        for name in [
            "add_task",
            "get_tasks",
            "update_task_status",
            "delete_task",
            "get_task_statistics",
        ] {
            assert!(registry.get(name).is_some(), "missing tool {}", name);
        }
    }
}
