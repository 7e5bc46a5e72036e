//! Conversation listing and history for the chat UI.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use taskdeck_store::{conversations, Conversation, Message, MessageRole};
use taskdeck_store::conversations::{DEFAULT_CONVERSATION_LIST_LIMIT, MAX_CONVERSATION_HISTORY};

use crate::api::{store_error, ApiError, ApiQuery, ErrorResponse};
use crate::auth::AuthUser;
use crate::state::AppState;

#[derive(Debug, Serialize, ToSchema)]
pub struct ConversationResponse {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Conversation> for ConversationResponse {
    fn from(c: Conversation) -> Self {
        Self {
            id: c.id,
            created_at: c.created_at,
            updated_at: c.updated_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub id: i64,
    #[schema(value_type = String, example = "assistant")]
    pub role: MessageRole,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl From<Message> for MessageResponse {
    fn from(m: Message) -> Self {
        Self {
            id: m.id,
            role: m.role,
            content: m.content,
            created_at: m.created_at,
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListConversationsQuery {
    /// Maximum conversations to return (default 20).
    #[serde(default = "default_list_limit")]
    pub limit: i64,
}

fn default_list_limit() -> i64 {
    DEFAULT_CONVERSATION_LIST_LIMIT
}

/// List the caller's conversations, most recently active first.
#[utoipa::path(
    get,
    path = "/conversations",
    tag = "chat",
    params(ListConversationsQuery),
    responses(
        (status = 200, description = "Conversations", body = [ConversationResponse]),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    )
)]
pub async fn list_conversations(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    ApiQuery(query): ApiQuery<ListConversationsQuery>,
) -> Result<Json<Vec<ConversationResponse>>, ApiError> {
    let conversations = conversations::list(&state.pool, user_id, query.limit)
        .await
        .map_err(store_error)?;
    Ok(Json(
        conversations
            .into_iter()
            .map(ConversationResponse::from)
            .collect(),
    ))
}

/// Fetch a conversation's messages in chronological order.
#[utoipa::path(
    get,
    path = "/conversations/{id}/messages",
    tag = "chat",
    params(("id" = i64, Path, description = "Conversation id")),
    responses(
        (status = 200, description = "Messages, oldest first", body = [MessageResponse]),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 404, description = "Conversation not found", body = ErrorResponse)
    )
)]
pub async fn conversation_messages(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<Vec<MessageResponse>>, ApiError> {
    let messages = conversations::history(&state.pool, id, user_id, MAX_CONVERSATION_HISTORY)
        .await
        .map_err(store_error)?;
    Ok(Json(messages.into_iter().map(MessageResponse::from).collect()))
}

/// Delete a conversation and its messages.
#[utoipa::path(
    delete,
    path = "/conversations/{id}",
    tag = "chat",
    params(("id" = i64, Path, description = "Conversation id")),
    responses(
        (status = 204, description = "Conversation deleted"),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 404, description = "Conversation not found", body = ErrorResponse)
    )
)]
pub async fn delete_conversation(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    conversations::delete(&state.pool, id, user_id)
        .await
        .map_err(store_error)?;
    Ok(StatusCode::NO_CONTENT)
}
