mod api;
mod app_config;
mod auth;
mod db;
mod router;
mod state;

use std::sync::Arc;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = app_config::load_config();
    config.log_summary();

    if !config.auth.secret_is_usable() {
        anyhow::bail!(
            "JWT_SECRET must be set and at least {} characters",
            taskdeck_core::config::MIN_JWT_SECRET_LEN
        );
    }

    let pool = db::init_pg_pool(&config.postgres).await?;
    let agent = app_config::build_agent(&config);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = Arc::new(AppState {
        pool,
        config,
        agent,
    });
    let app = router::build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("listening on {}", addr);

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
