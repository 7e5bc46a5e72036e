use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::StoreError;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    #[serde(skip_serializing)]
    pub hashed_password: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insert a new user. The caller supplies an already-hashed password.
pub async fn create(
    pool: &PgPool,
    email: &str,
    name: &str,
    hashed_password: &str,
) -> Result<User, StoreError> {
    let result = sqlx::query_as::<_, User>(
        "INSERT INTO users (id, email, name, hashed_password) \
         VALUES ($1, $2, $3, $4) \
         RETURNING id, email, name, hashed_password, created_at, updated_at",
    )
    .bind(Uuid::new_v4())
    .bind(email)
    .bind(name)
    .bind(hashed_password)
    .fetch_one(pool)
    .await;

    match result {
        Ok(user) => {
            tracing::info!(user_id = %user.id, "user created");
            Ok(user)
        }
        Err(sqlx::Error::Database(db)) if db.is_unique_violation() => Err(StoreError::EmailTaken),
        Err(e) => Err(e.into()),
    }
}

pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, StoreError> {
    let user = sqlx::query_as::<_, User>(
        "SELECT id, email, name, hashed_password, created_at, updated_at \
         FROM users WHERE email = $1",
    )
    .bind(email)
    .fetch_optional(pool)
    .await?;
    Ok(user)
}
