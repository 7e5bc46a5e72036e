//! OpenAPI documentation aggregator.
//!
//! Collects all `#[utoipa::path]`-annotated handlers and `ToSchema`-derived
//! types into a single spec, served via Scalar UI at `/docs`.

use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "taskdeck API",
        version = "0.1.0",
        description = "Multi-user task management with JWT cookie auth and an AI assistant that manages tasks through tool calls.",
    ),
    tags(
        (name = "health", description = "Liveness probe"),
        (name = "auth", description = "Signup, login, and logout"),
        (name = "tasks", description = "Task CRUD and statistics"),
        (name = "chat", description = "AI assistant, conversations, and tool introspection"),
    ),
    paths(
        // Health
        crate::api::health::health,
        // Auth
        crate::api::auth::signup,
        crate::api::auth::login,
        crate::api::auth::logout,
        // Tasks
        crate::api::tasks::list_tasks,
        crate::api::tasks::create_task,
        crate::api::tasks::task_statistics,
        crate::api::tasks::get_task,
        crate::api::tasks::update_task,
        crate::api::tasks::delete_task,
        crate::api::tasks::toggle_task,
        // Chat
        crate::api::chat::chat,
        crate::api::chat::chat_health,
        crate::api::chat::chat_tools,
        crate::api::conversations::list_conversations,
        crate::api::conversations::conversation_messages,
        crate::api::conversations::delete_conversation,
    ),
    components(schemas(
        // Shared
        crate::api::ErrorResponse,
        // Health
        crate::api::health::HealthResponse,
        // Auth
        crate::api::auth::SignupRequest,
        crate::api::auth::LoginRequest,
        crate::api::auth::UserResponse,
        crate::api::auth::AuthResponse,
        crate::api::auth::LogoutResponse,
        // Tasks
        crate::api::tasks::TaskResponse,
        crate::api::tasks::CreateTaskRequest,
        crate::api::tasks::UpdateTaskRequest,
        crate::api::tasks::StatisticsResponse,
        // Chat
        crate::api::chat::ChatRequest,
        crate::api::chat::ChatResponse,
        crate::api::chat::ChatHealthResponse,
        crate::api::chat::ToolsResponse,
        crate::api::chat::ToolInfo,
        crate::api::conversations::ConversationResponse,
        crate::api::conversations::MessageResponse,
    ))
)]
pub struct ApiDoc;
