use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::StoreError;

/// Default history window sent to the model per chat turn.
pub const MAX_CONVERSATION_HISTORY: i64 = 50;

pub const DEFAULT_CONVERSATION_LIST_LIMIT: i64 = 20;

/// Role of a message sender, stored as the Postgres enum `message_role`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "message_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Conversation {
    pub id: i64,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Message {
    pub id: i64,
    pub conversation_id: i64,
    pub user_id: Uuid,
    pub role: MessageRole,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

pub async fn create(pool: &PgPool, user_id: Uuid) -> Result<Conversation, StoreError> {
    let conversation = sqlx::query_as::<_, Conversation>(
        "INSERT INTO conversations (user_id) VALUES ($1) \
         RETURNING id, user_id, created_at, updated_at",
    )
    .bind(user_id)
    .fetch_one(pool)
    .await?;

    tracing::info!(conversation_id = conversation.id, user_id = %user_id, "conversation created");
    Ok(conversation)
}

/// Get a conversation by id, user-scoped.
pub async fn get(
    pool: &PgPool,
    conversation_id: i64,
    user_id: Uuid,
) -> Result<Conversation, StoreError> {
    sqlx::query_as::<_, Conversation>(
        "SELECT id, user_id, created_at, updated_at \
         FROM conversations WHERE id = $1 AND user_id = $2",
    )
    .bind(conversation_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?
    .ok_or(StoreError::NotFound)
}

/// Resolve an optional conversation id: fetch when given, create when not.
pub async fn get_or_create(
    pool: &PgPool,
    user_id: Uuid,
    conversation_id: Option<i64>,
) -> Result<Conversation, StoreError> {
    match conversation_id {
        Some(id) => get(pool, id, user_id).await,
        None => create(pool, user_id).await,
    }
}

/// List the user's conversations, most recently updated first.
pub async fn list(
    pool: &PgPool,
    user_id: Uuid,
    limit: i64,
) -> Result<Vec<Conversation>, StoreError> {
    let conversations = sqlx::query_as::<_, Conversation>(
        "SELECT id, user_id, created_at, updated_at \
         FROM conversations WHERE user_id = $1 \
         ORDER BY updated_at DESC LIMIT $2",
    )
    .bind(user_id)
    .bind(limit.max(1))
    .fetch_all(pool)
    .await?;
    Ok(conversations)
}

/// Delete a conversation; messages cascade via FK.
pub async fn delete(pool: &PgPool, conversation_id: i64, user_id: Uuid) -> Result<(), StoreError> {
    let result = sqlx::query("DELETE FROM conversations WHERE id = $1 AND user_id = $2")
        .bind(conversation_id)
        .bind(user_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(StoreError::NotFound);
    }
    tracing::info!(conversation_id, user_id = %user_id, "conversation deleted");
    Ok(())
}

/// Append a message and bump the conversation's `updated_at`.
pub async fn append_message(
    pool: &PgPool,
    conversation_id: i64,
    user_id: Uuid,
    role: MessageRole,
    content: &str,
) -> Result<Message, StoreError> {
    // Ownership check doubles as existence check.
    get(pool, conversation_id, user_id).await?;

    let mut tx = pool.begin().await.map_err(StoreError::Database)?;

    let message = sqlx::query_as::<_, Message>(
        "INSERT INTO messages (conversation_id, user_id, role, content) \
         VALUES ($1, $2, $3, $4) \
         RETURNING id, conversation_id, user_id, role, content, created_at",
    )
    .bind(conversation_id)
    .bind(user_id)
    .bind(role)
    .bind(content)
    .fetch_one(&mut *tx)
    .await?;

    sqlx::query("UPDATE conversations SET updated_at = now() WHERE id = $1")
        .bind(conversation_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await.map_err(StoreError::Database)?;
    Ok(message)
}

/// Last `limit` messages of a conversation, returned in chronological order.
pub async fn history(
    pool: &PgPool,
    conversation_id: i64,
    user_id: Uuid,
    limit: i64,
) -> Result<Vec<Message>, StoreError> {
    get(pool, conversation_id, user_id).await?;

    let mut messages = sqlx::query_as::<_, Message>(
        "SELECT id, conversation_id, user_id, role, content, created_at \
         FROM messages \
         WHERE conversation_id = $1 AND user_id = $2 \
         ORDER BY created_at DESC, id DESC LIMIT $3",
    )
    .bind(conversation_id)
    .bind(user_id)
    .bind(limit.max(1))
    .fetch_all(pool)
    .await?;

    messages.reverse();
    Ok(messages)
}


#[cfg(test)]
mod pg_tests {
    use super::*;
    use crate::test_support::{seed_user, test_pool};

    #[tokio::test]
    #[ignore]
    async fn history_returns_the_last_n_messages_in_order() {
        let pool = test_pool().await;
        let user = seed_user(&pool).await;
        let conversation = create(&pool, user.id).await.unwrap();

        for i in 1..=5 {
            append_message(
                &pool,
                conversation.id,
                user.id,
                MessageRole::User,
                &format!("message {}", i),
            )
            .await
            .unwrap();
        }

        let window = history(&pool, conversation.id, user.id, 3).await.unwrap();
        let contents: Vec<&str> = window.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["message 3", "message 4", "message 5"]);
    }

    #[tokio::test]
    #[ignore]
    async fn append_message_bumps_conversation_updated_at() {
        let pool = test_pool().await;
        let user = seed_user(&pool).await;
        let conversation = create(&pool, user.id).await.unwrap();

        append_message(&pool, conversation.id, user.id, MessageRole::User, "hello")
            .await
            .unwrap();

        let refreshed = get(&pool, conversation.id, user.id).await.unwrap();
        assert!(refreshed.updated_at >= conversation.updated_at);
    }

    #[tokio::test]
    #[ignore]
    async fn delete_cascades_to_messages() {
        let pool = test_pool().await;
        let user = seed_user(&pool).await;
        let conversation = create(&pool, user.id).await.unwrap();
        append_message(&pool, conversation.id, user.id, MessageRole::User, "hi")
            .await
            .unwrap();

        delete(&pool, conversation.id, user.id).await.unwrap();

        assert!(matches!(
            get(&pool, conversation.id, user.id).await,
            Err(StoreError::NotFound)
        ));
        let orphans: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM messages WHERE conversation_id = $1")
                .bind(conversation.id)
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(orphans, 0);
    }

    #[tokio::test]
    #[ignore]
    async fn foreign_conversations_are_not_found() {
        let pool = test_pool().await;
        let owner = seed_user(&pool).await;
        let stranger = seed_user(&pool).await;
        let conversation = create(&pool, owner.id).await.unwrap();

        assert!(matches!(
            get(&pool, conversation.id, stranger.id).await,
            Err(StoreError::NotFound)
        ));
        assert!(matches!(
            append_message(&pool, conversation.id, stranger.id, MessageRole::User, "hi").await,
            Err(StoreError::NotFound)
        ));
        assert!(matches!(
            delete(&pool, conversation.id, stranger.id).await,
            Err(StoreError::NotFound)
        ));
    }
}
