//! Postgres data layer: users, tasks, conversations, messages.
//!
//! Each entity module exposes free async functions over `&PgPool`. All task
//! and conversation operations are scoped to an owning user; a row owned by
//! somebody else is indistinguishable from a missing row (`NotFound`).

pub mod conversations;
pub mod error;
pub mod tasks;
pub mod users;

pub use conversations::{Conversation, Message, MessageRole};
pub use error::StoreError;
pub use tasks::{Task, TaskPatch, TaskStatistics};
pub use users::User;

#[cfg(test)]
pub(crate) mod test_support {
    use sqlx::PgPool;

    use crate::users::{self, User};

    /// Pool against `DATABASE_URL` with migrations applied. Tests using this
    /// are `#[ignore]`-gated; run them against a live Postgres with
    /// `DATABASE_URL=... cargo test -p taskdeck-store -- --ignored`.
    pub async fn test_pool() -> PgPool {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for DB tests");
        let pool = PgPool::connect(&url).await.expect("connect to postgres");
        sqlx::migrate!("../../migrations")
            .run(&pool)
            .await
            .expect("apply migrations");
        pool
    }

    /// Fresh user with a unique email, isolating each test's rows.
    pub async fn seed_user(pool: &PgPool) -> User {
        let email = format!("{}@example.com", uuid::Uuid::new_v4());
        users::create(pool, &email, "Test User", "fake-bcrypt-hash")
            .await
            .expect("seed user")
    }
}
