//! HTTP handlers, grouped by resource.

pub mod auth;
pub mod chat;
pub mod conversations;
pub mod doc;
pub mod health;
pub mod tasks;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{FromRequest, FromRequestParts, Query, Request};
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use taskdeck_store::StoreError;

/// Error body returned by every failing endpoint.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

pub type ApiError = (StatusCode, Json<ErrorResponse>);

pub fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

/// `Json` extractor whose rejections share the `ErrorResponse` body shape
/// instead of axum's plain-text defaults.
pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(ApiJson(value)),
            Err(rejection) => Err(api_error(rejection.status(), rejection.body_text())),
        }
    }
}

/// `Query` extractor with `ErrorResponse`-shaped rejections.
pub struct ApiQuery<T>(pub T);

impl<S, T> FromRequestParts<S> for ApiQuery<T>
where
    Query<T>: FromRequestParts<S, Rejection = QueryRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Query::<T>::from_request_parts(parts, state).await {
            Ok(Query(value)) => Ok(ApiQuery(value)),
            Err(rejection) => Err(api_error(StatusCode::BAD_REQUEST, rejection.body_text())),
        }
    }
}

/// Map storage failures to HTTP responses. Database internals never
/// leak into the body.
pub fn store_error(err: StoreError) -> ApiError {
    match err {
        StoreError::NotFound => api_error(StatusCode::NOT_FOUND, "not found"),
        StoreError::EmailTaken => api_error(StatusCode::CONFLICT, "email already registered"),
        StoreError::InvalidTitle(msg) => api_error(StatusCode::BAD_REQUEST, msg),
        StoreError::Database(e) => {
            tracing::error!(error = %e, "database error");
            api_error(StatusCode::INTERNAL_SERVER_ERROR, "internal server error")
        }
    }
}
