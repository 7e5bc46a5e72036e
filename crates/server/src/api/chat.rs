//! AI chat over the task tools.
//!
//! A chat turn is durable even when the model is unavailable: the user's
//! message and an assistant reply (real or fallback) are always persisted,
//! and the endpoint answers 200 either way.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use taskdeck_agent::ToolContext;
use taskdeck_llm::{ChatMessage, ToolDefinition};
use taskdeck_store::{conversations, MessageRole};
use taskdeck_store::conversations::MAX_CONVERSATION_HISTORY;

use crate::api::{api_error, store_error, ApiError, ApiJson, ErrorResponse};
use crate::auth::AuthUser;
use crate::state::AppState;

pub const MAX_MESSAGE_LEN: usize = 1000;

const FALLBACK_REPLY: &str =
    "The AI assistant is not configured on this server. \
     You can still manage your tasks through the regular task endpoints.";

const ERROR_REPLY: &str =
    "Sorry, I ran into a problem while handling that. Please try again in a moment.";

#[derive(Debug, Deserialize, ToSchema)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub conversation_id: Option<i64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ChatResponse {
    pub conversation_id: i64,
    pub response: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    /// Tool names the agent invoked this turn, in execution order. Omitted
    /// when no tools ran.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools_used: Option<Vec<String>>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ChatHealthResponse {
    pub status: &'static str,
    pub provider: Option<String>,
    pub model: String,
    pub tools_registered: usize,
    pub tool_names: Vec<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ToolsResponse {
    pub tools: Vec<ToolInfo>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ToolInfo {
    pub name: String,
    pub description: String,
}

impl From<ToolDefinition> for ToolInfo {
    fn from(def: ToolDefinition) -> Self {
        Self {
            name: def.name,
            description: def.description,
        }
    }
}

fn validate_message(message: &str) -> Result<(), ApiError> {
    if message.trim().is_empty() {
        return Err(api_error(StatusCode::BAD_REQUEST, "message must not be empty"));
    }
    if message.chars().count() > MAX_MESSAGE_LEN {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            format!("message must be at most {} characters", MAX_MESSAGE_LEN),
        ));
    }
    Ok(())
}

/// Turn persisted messages into provider chat history.
fn to_chat_history(messages: Vec<conversations::Message>) -> Vec<ChatMessage> {
    messages
        .into_iter()
        .map(|m| match m.role {
            MessageRole::User => ChatMessage::User(m.content),
            MessageRole::Assistant => ChatMessage::Assistant {
                text: Some(m.content),
                tool_calls: Vec::new(),
            },
        })
        .collect()
}

/// Send a message to the assistant.
#[utoipa::path(
    post,
    path = "/chat",
    tag = "chat",
    request_body = ChatRequest,
    responses(
        (status = 200, description = "Assistant reply", body = ChatResponse),
        (status = 400, description = "Invalid message", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 404, description = "Conversation not found", body = ErrorResponse)
    )
)]
pub async fn chat(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    ApiJson(req): ApiJson<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    validate_message(&req.message)?;

    let conversation = conversations::get_or_create(&state.pool, user_id, req.conversation_id)
        .await
        .map_err(store_error)?;

    // History excludes the message being sent; it is appended by the agent.
    let history = conversations::history(
        &state.pool,
        conversation.id,
        user_id,
        MAX_CONVERSATION_HISTORY,
    )
    .await
    .map_err(store_error)?;

    conversations::append_message(
        &state.pool,
        conversation.id,
        user_id,
        MessageRole::User,
        req.message.trim(),
    )
    .await
    .map_err(store_error)?;

    let (reply, tools_used) = match &state.agent {
        None => (FALLBACK_REPLY.to_string(), Vec::new()),
        Some(agent) => {
            let ctx = ToolContext {
                pool: state.pool.clone(),
                user_id,
            };
            match agent
                .run(to_chat_history(history), req.message.trim().to_string(), &ctx)
                .await
            {
                Ok(outcome) => (outcome.text, outcome.tools_used),
                Err(e) => {
                    tracing::error!(
                        error = %e,
                        conversation_id = conversation.id,
                        "agent turn failed"
                    );
                    (ERROR_REPLY.to_string(), Vec::new())
                }
            }
        }
    };

    let assistant_message = conversations::append_message(
        &state.pool,
        conversation.id,
        user_id,
        MessageRole::Assistant,
        &reply,
    )
    .await
    .map_err(store_error)?;

    Ok(Json(ChatResponse {
        conversation_id: conversation.id,
        response: reply,
        created_at: assistant_message.created_at,
        tools_used: (!tools_used.is_empty()).then_some(tools_used),
    }))
}

/// Report whether the assistant is operational.
#[utoipa::path(
    get,
    path = "/chat/health",
    tag = "chat",
    responses(
        (status = 200, description = "Assistant status", body = ChatHealthResponse)
    )
)]
pub async fn chat_health(State(state): State<Arc<AppState>>) -> Json<ChatHealthResponse> {
    let model = state.config.llm.model.clone();
    match &state.agent {
        Some(agent) => Json(ChatHealthResponse {
            status: "operational",
            provider: Some(agent.provider_name().to_string()),
            model,
            tools_registered: agent.registry().len(),
            tool_names: agent
                .registry()
                .definitions()
                .into_iter()
                .map(|d| d.name)
                .collect(),
        }),
        None => Json(ChatHealthResponse {
            status: "degraded",
            provider: None,
            model,
            tools_registered: 0,
            tool_names: Vec::new(),
        }),
    }
}

/// List the tools available to the assistant.
#[utoipa::path(
    get,
    path = "/chat/tools",
    tag = "chat",
    responses(
        (status = 200, description = "Available tools", body = ToolsResponse)
    )
)]
pub async fn chat_tools() -> Result<Json<ToolsResponse>, ApiError> {
    // Built fresh: the tool set is static and the agent may be absent.
    let mut registry = taskdeck_agent::ToolRegistry::new();
    taskdeck_agent::register_task_tools(&mut registry).map_err(|e| {
        tracing::error!(error = %e, "tool registration failed");
        api_error(StatusCode::INTERNAL_SERVER_ERROR, "internal server error")
    })?;

    Ok(Json(ToolsResponse {
        tools: registry.definitions().into_iter().map(ToolInfo::from).collect(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    #[test]
    fn message_validation_bounds() {
        assert!(validate_message("hi").is_ok());
        assert!(validate_message("").is_err());
        assert!(validate_message("   ").is_err());
        assert!(validate_message(&"x".repeat(MAX_MESSAGE_LEN)).is_ok());
        assert!(validate_message(&"x".repeat(MAX_MESSAGE_LEN + 1)).is_err());
    }

    #[test]
    fn tools_used_omitted_when_no_tools_ran() {
        let response = ChatResponse {
            conversation_id: 1,
            response: "hi".into(),
            created_at: Utc::now(),
            tools_used: None,
        };
        let json = serde_json::to_value(&response).unwrap();
        assert!(json.get("tools_used").is_none());

        let response = ChatResponse {
            tools_used: Some(vec!["add_task".into()]),
            ..response
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["tools_used"][0], "add_task");
    }

    #[test]
    fn history_conversion_keeps_roles() {
        let user_id = Uuid::new_v4();
        let messages = vec![
            conversations::Message {
                id: 1,
                conversation_id: 7,
                user_id,
                role: MessageRole::User,
                content: "add a task".into(),
                created_at: Utc::now(),
            },
            conversations::Message {
                id: 2,
                conversation_id: 7,
                user_id,
                role: MessageRole::Assistant,
                content: "done".into(),
                created_at: Utc::now(),
            },
        ];

        let history = to_chat_history(messages);
        assert!(matches!(&history[0], ChatMessage::User(text) if text == "add a task"));
        assert!(matches!(
            &history[1],
            ChatMessage::Assistant { text: Some(t), tool_calls } if t == "done" && tool_calls.is_empty()
        ));
    }
}
