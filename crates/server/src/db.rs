use anyhow::Context;
use sqlx::PgPool;
use tracing::info;

/// Create the PostgreSQL connection pool and run migrations.
pub async fn init_pg_pool(config: &taskdeck_core::config::PostgresConfig) -> anyhow::Result<PgPool> {
    if config.url.is_empty() {
        anyhow::bail!("DATABASE_URL is not configured");
    }

    let pool = PgPool::connect(&config.url)
        .await
        .context("failed to connect to PostgreSQL")?;
    info!("PostgreSQL connected");

    sqlx::migrate!("../../migrations")
        .run(&pool)
        .await
        .context("failed to run migrations")?;
    info!("database migrations applied");

    Ok(pool)
}
