//! HTTP router construction.
//!
//! Assembles all Axum routes, CORS, and OpenAPI docs into a single `Router`.

use std::sync::Arc;

use axum::http::{header, HeaderValue, Method};
use axum::routing::{delete, get, patch, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tracing::warn;
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

use crate::api;
use crate::state::AppState;

/// Credentialed CORS: explicit origins from config, never a wildcard,
/// because the browser sends the auth cookie cross-origin.
fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin, "ignoring unparseable CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true)
}

/// Build the complete application router with all routes and middleware.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = cors_layer(&state.config.server.allowed_origins);

    Router::new()
        .route("/health", get(api::health::health))
        .route("/auth/signup", post(api::auth::signup))
        .route("/auth/login", post(api::auth::login))
        .route("/auth/logout", post(api::auth::logout))
        // /tasks/statistics MUST precede /tasks/{id} to avoid capture
        .route("/tasks/statistics", get(api::tasks::task_statistics))
        .route(
            "/tasks",
            get(api::tasks::list_tasks).post(api::tasks::create_task),
        )
        .route(
            "/tasks/{id}",
            get(api::tasks::get_task)
                .put(api::tasks::update_task)
                .delete(api::tasks::delete_task),
        )
        .route("/tasks/{id}/complete", patch(api::tasks::toggle_task))
        .route("/chat", post(api::chat::chat))
        .route("/chat/health", get(api::chat::chat_health))
        .route("/chat/tools", get(api::chat::chat_tools))
        .route("/conversations", get(api::conversations::list_conversations))
        .route(
            "/conversations/{id}",
            delete(api::conversations::delete_conversation),
        )
        .route(
            "/conversations/{id}/messages",
            get(api::conversations::conversation_messages),
        )
        .layer(cors)
        .with_state(state)
        .merge(Scalar::with_url("/docs", api::doc::ApiDoc::openapi()))
}

#[cfg(test)]
mod tests {
    use super::*;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use sqlx::postgres::PgPool;
    use tower::ServiceExt;

    use taskdeck_core::config::{AuthConfig, Config, LlmConfig, PostgresConfig, ServerConfig};

    use crate::auth::create_access_token;

    fn test_state() -> Arc<AppState> {
        let config = Config {
            server: ServerConfig {
                host: "127.0.0.1".into(),
                port: 0,
                allowed_origins: vec!["http://localhost:3000".into()],
            },
            postgres: PostgresConfig { url: String::new() },
            auth: AuthConfig {
                jwt_secret: "0123456789abcdef0123456789abcdef".into(),
                jwt_expiration_hours: 24,
                cookie_max_age_secs: 3600,
            },
            llm: LlmConfig {
                anthropic_api_key: None,
                model: "claude-3-5-sonnet-20241022".into(),
                max_tokens: 2048,
                max_tool_iterations: 10,
            },
        };
        // Lazy pool: never connected by the routes these tests exercise.
        let pool = PgPool::connect_lazy("postgres://localhost/taskdeck_test").unwrap();
        Arc::new(AppState {
            pool,
            config,
            agent: None,
        })
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn health_is_open() {
        let app = build_router(test_state());
        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["status"], "healthy");
    }

    #[tokio::test]
    async fn tasks_require_auth() {
        let app = build_router(test_state());
        let response = app
            .oneshot(Request::get("/tasks").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.headers().get(header::WWW_AUTHENTICATE).unwrap(),
            "Bearer"
        );
    }

    #[tokio::test]
    async fn garbage_bearer_token_rejected() {
        let app = build_router(test_state());
        let response = app
            .oneshot(
                Request::get("/tasks")
                    .header(header::AUTHORIZATION, "Bearer not.a.token")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn chat_health_reports_degraded_without_agent() {
        let app = build_router(test_state());
        let response = app
            .oneshot(Request::get("/chat/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "degraded");
        assert_eq!(body["tools_registered"], 0);
    }

    #[tokio::test]
    async fn chat_tools_lists_the_task_tool_set() {
        let app = build_router(test_state());
        let response = app
            .oneshot(Request::get("/chat/tools").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        let names: Vec<&str> = body["tools"]
            .as_array()
            .unwrap()
            .iter()
            .map(|t| t["name"].as_str().unwrap())
            .collect();
        assert_eq!(
            names,
            vec![
                "add_task",
                "delete_task",
                "get_task_statistics",
                "get_tasks",
                "update_task_status"
            ]
        );
    }

    #[tokio::test]
    async fn logout_clears_cookie() {
        let app = build_router(test_state());
        let response = app
            .oneshot(Request::post("/auth/logout").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .unwrap()
            .to_str()
            .unwrap();
        assert!(cookie.starts_with("access_token=;"));
        assert!(cookie.contains("Max-Age=0"));
    }

    #[tokio::test]
    async fn chat_rejects_empty_message_before_touching_the_db() {
        let state = test_state();
        let token = create_access_token(uuid::Uuid::new_v4(), &state.config.auth).unwrap();
        let app = build_router(state);
        let response = app
            .oneshot(
                Request::post("/chat")
                    .header(header::CONTENT_TYPE, "application/json")
                    .header(header::COOKIE, format!("access_token={}", token))
                    .body(Body::from(r#"{"message": "   "}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn signup_validates_before_touching_the_db() {
        let app = build_router(test_state());
        let response = app
            .oneshot(
                Request::post("/auth/signup")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(
                        r#"{"email": "a@b.co", "name": "Ada", "password": "short"}"#,
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert!(body["error"].as_str().unwrap().contains("password"));
    }

    #[tokio::test]
    async fn malformed_json_body_gets_json_error() {
        let app = build_router(test_state());
        let response = app
            .oneshot(
                Request::post("/auth/login")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from("{not json"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert!(response.status().is_client_error());
        let body = body_json(response).await;
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn bad_query_param_gets_json_error() {
        let state = test_state();
        let token = create_access_token(uuid::Uuid::new_v4(), &state.config.auth).unwrap();
        let app = build_router(state);
        let response = app
            .oneshot(
                Request::get("/tasks?limit=abc")
                    .header(header::COOKIE, format!("access_token={}", token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn docs_ui_is_served() {
        let app = build_router(test_state());
        let response = app
            .oneshot(Request::get("/docs").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
