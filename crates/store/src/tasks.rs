use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::StoreError;

pub const MAX_TITLE_LEN: usize = 200;
pub const MAX_PAGE_SIZE: i64 = 100;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Task {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Partial update; `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub completed: Option<bool>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TaskStatistics {
    pub total_tasks: i64,
    pub pending_tasks: i64,
    pub completed_tasks: i64,
    pub completion_rate: f64,
    pub tasks_created_today: i64,
    pub tasks_completed_today: i64,
    pub streak_days: i64,
}

/// Reject empty (after trim) or over-long titles before they reach the DB.
pub fn validate_title(title: &str) -> Result<(), StoreError> {
    if title.trim().is_empty() {
        return Err(StoreError::InvalidTitle("title must not be empty".into()));
    }
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(StoreError::InvalidTitle(format!(
            "title must be at most {} characters",
            MAX_TITLE_LEN
        )));
    }
    Ok(())
}

/// List active (non-deleted) tasks for a user, newest first.
pub async fn list(
    pool: &PgPool,
    user_id: Uuid,
    skip: i64,
    limit: i64,
    completed: Option<bool>,
) -> Result<Vec<Task>, StoreError> {
    let limit = limit.clamp(1, MAX_PAGE_SIZE);
    let skip = skip.max(0);

    let tasks = sqlx::query_as::<_, Task>(
        "SELECT id, user_id, title, description, completed, created_at, updated_at, deleted_at \
         FROM tasks \
         WHERE user_id = $1 AND deleted_at IS NULL \
           AND ($2::boolean IS NULL OR completed = $2) \
         ORDER BY created_at DESC \
         OFFSET $3 LIMIT $4",
    )
    .bind(user_id)
    .bind(completed)
    .bind(skip)
    .bind(limit)
    .fetch_all(pool)
    .await?;
    Ok(tasks)
}

pub async fn create(
    pool: &PgPool,
    user_id: Uuid,
    title: &str,
    description: Option<&str>,
) -> Result<Task, StoreError> {
    validate_title(title)?;

    let task = sqlx::query_as::<_, Task>(
        "INSERT INTO tasks (id, user_id, title, description) \
         VALUES ($1, $2, $3, $4) \
         RETURNING id, user_id, title, description, completed, created_at, updated_at, deleted_at",
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(title)
    .bind(description)
    .fetch_one(pool)
    .await?;

    tracing::info!(task_id = %task.id, user_id = %user_id, "task created");
    Ok(task)
}

/// Get a single active task, user-scoped.
pub async fn get(pool: &PgPool, task_id: Uuid, user_id: Uuid) -> Result<Task, StoreError> {
    sqlx::query_as::<_, Task>(
        "SELECT id, user_id, title, description, completed, created_at, updated_at, deleted_at \
         FROM tasks \
         WHERE id = $1 AND user_id = $2 AND deleted_at IS NULL",
    )
    .bind(task_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?
    .ok_or(StoreError::NotFound)
}

/// Partial update. Always bumps `updated_at`, even if no field changed.
pub async fn update(
    pool: &PgPool,
    task_id: Uuid,
    user_id: Uuid,
    patch: TaskPatch,
) -> Result<Task, StoreError> {
    if let Some(ref title) = patch.title {
        validate_title(title)?;
    }

    sqlx::query_as::<_, Task>(
        "UPDATE tasks SET \
           title = COALESCE($3, title), \
           description = COALESCE($4, description), \
           completed = COALESCE($5, completed), \
           updated_at = now() \
         WHERE id = $1 AND user_id = $2 AND deleted_at IS NULL \
         RETURNING id, user_id, title, description, completed, created_at, updated_at, deleted_at",
    )
    .bind(task_id)
    .bind(user_id)
    .bind(patch.title)
    .bind(patch.description)
    .bind(patch.completed)
    .fetch_optional(pool)
    .await?
    .ok_or(StoreError::NotFound)
}

/// Soft delete: set `deleted_at`, keep the row.
pub async fn soft_delete(pool: &PgPool, task_id: Uuid, user_id: Uuid) -> Result<(), StoreError> {
    let result = sqlx::query(
        "UPDATE tasks SET deleted_at = now(), updated_at = now() \
         WHERE id = $1 AND user_id = $2 AND deleted_at IS NULL",
    )
    .bind(task_id)
    .bind(user_id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(StoreError::NotFound);
    }
    tracing::info!(task_id = %task_id, user_id = %user_id, "task soft-deleted");
    Ok(())
}

pub async fn toggle_complete(
    pool: &PgPool,
    task_id: Uuid,
    user_id: Uuid,
) -> Result<Task, StoreError> {
    sqlx::query_as::<_, Task>(
        "UPDATE tasks SET completed = NOT completed, updated_at = now() \
         WHERE id = $1 AND user_id = $2 AND deleted_at IS NULL \
         RETURNING id, user_id, title, description, completed, created_at, updated_at, deleted_at",
    )
    .bind(task_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?
    .ok_or(StoreError::NotFound)
}

/// Aggregate counts over the user's active tasks, computed in a single query.
///
/// `tasks_completed_today` uses `updated_at` as a completion-time proxy, as
/// the schema carries no dedicated `completed_at` column.
pub async fn statistics(pool: &PgPool, user_id: Uuid) -> Result<TaskStatistics, StoreError> {
    let row: (i64, i64, i64, i64) = sqlx::query_as(
        "SELECT \
           COUNT(*), \
           COUNT(*) FILTER (WHERE completed), \
           COUNT(*) FILTER (WHERE (created_at AT TIME ZONE 'utc')::date = (now() AT TIME ZONE 'utc')::date), \
           COUNT(*) FILTER (WHERE completed AND (updated_at AT TIME ZONE 'utc')::date = (now() AT TIME ZONE 'utc')::date) \
         FROM tasks WHERE user_id = $1 AND deleted_at IS NULL",
    )
    .bind(user_id)
    .fetch_one(pool)
    .await?;

    let (total, completed, created_today, completed_today) = row;
    Ok(build_statistics(total, completed, created_today, completed_today))
}

fn build_statistics(
    total: i64,
    completed: i64,
    created_today: i64,
    completed_today: i64,
) -> TaskStatistics {
    let completion_rate = if total > 0 {
        (completed as f64 / total as f64 * 1000.0).round() / 10.0
    } else {
        0.0
    };
    TaskStatistics {
        total_tasks: total,
        pending_tasks: total - completed,
        completed_tasks: completed,
        completion_rate,
        tasks_created_today: created_today,
        tasks_completed_today: completed_today,
        streak_days: if completed_today > 0 { 1 } else { 0 },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_rejects_empty() {
        assert!(matches!(validate_title(""), Err(StoreError::InvalidTitle(_))));
        assert!(matches!(validate_title("   "), Err(StoreError::InvalidTitle(_))));
    }

    #[test]
    fn title_rejects_over_200_chars() {
        let long = "x".repeat(MAX_TITLE_LEN + 1);
        assert!(matches!(validate_title(&long), Err(StoreError::InvalidTitle(_))));
    }

    #[test]
    fn title_accepts_boundary() {
        assert!(validate_title("a").is_ok());
        assert!(validate_title(&"x".repeat(MAX_TITLE_LEN)).is_ok());
    }

    #[test]
    fn statistics_rate_rounds_to_one_decimal() {
        let stats = build_statistics(3, 1, 0, 0);
        assert_eq!(stats.completion_rate, 33.3);
        assert_eq!(stats.pending_tasks, 2);
        assert_eq!(stats.streak_days, 0);
    }

    #[test]
    fn statistics_empty_set() {
        let stats = build_statistics(0, 0, 0, 0);
        assert_eq!(stats.completion_rate, 0.0);
        assert_eq!(stats.total_tasks, 0);
    }

    #[test]
    fn statistics_streak_follows_today_completions() {
        let stats = build_statistics(5, 5, 2, 3);
        assert_eq!(stats.completion_rate, 100.0);
        assert_eq!(stats.streak_days, 1);
    }
}
