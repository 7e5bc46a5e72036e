//! Signup, login, and logout. Successful signup/login installs the
//! `access_token` cookie; logout clears it.

use std::sync::Arc;

use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use taskdeck_store::{users, User};

use crate::api::{api_error, store_error, ApiError, ApiJson, ErrorResponse};
use crate::auth::{auth_cookie, clear_auth_cookie, create_access_token, hash_password, verify_password};
use crate::state::AppState;

pub const MIN_PASSWORD_LEN: usize = 8;
/// Column limit on `users.email` and `users.name`.
pub const MAX_EMAIL_LEN: usize = 255;
pub const MAX_NAME_LEN: usize = 255;

#[derive(Debug, Deserialize, ToSchema)]
pub struct SignupRequest {
    pub email: String,
    pub name: String,
    pub password: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub user: UserResponse,
    pub access_token: String,
    pub token_type: &'static str,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LogoutResponse {
    pub message: &'static str,
}

fn validate_signup(req: &SignupRequest) -> Result<(), ApiError> {
    let email = req.email.trim();
    if !email.contains('@') || email.len() < 3 {
        return Err(api_error(StatusCode::BAD_REQUEST, "invalid email address"));
    }
    if email.chars().count() > MAX_EMAIL_LEN {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            format!("email must be at most {} characters", MAX_EMAIL_LEN),
        ));
    }
    let name = req.name.trim();
    if name.is_empty() {
        return Err(api_error(StatusCode::BAD_REQUEST, "name must not be empty"));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            format!("name must be at most {} characters", MAX_NAME_LEN),
        ));
    }
    if req.password.len() < MIN_PASSWORD_LEN {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            format!("password must be at least {} characters", MIN_PASSWORD_LEN),
        ));
    }
    Ok(())
}

fn issue_session(
    state: &AppState,
    user: User,
) -> Result<(HeaderMap, Json<AuthResponse>), ApiError> {
    let token = create_access_token(user.id, &state.config.auth).map_err(|e| {
        tracing::error!(error = %e, "token signing failed");
        api_error(StatusCode::INTERNAL_SERVER_ERROR, "internal server error")
    })?;

    let mut headers = HeaderMap::new();
    let cookie = auth_cookie(&token, state.config.auth.cookie_max_age_secs);
    headers.insert(
        header::SET_COOKIE,
        cookie.parse().map_err(|_| {
            api_error(StatusCode::INTERNAL_SERVER_ERROR, "internal server error")
        })?,
    );

    Ok((
        headers,
        Json(AuthResponse {
            user: user.into(),
            access_token: token,
            token_type: "bearer",
        }),
    ))
}

/// Register a new account.
#[utoipa::path(
    post,
    path = "/auth/signup",
    tag = "auth",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "Account created", body = AuthResponse),
        (status = 400, description = "Invalid email, name, or password", body = ErrorResponse),
        (status = 409, description = "Email already registered", body = ErrorResponse)
    )
)]
pub async fn signup(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<SignupRequest>,
) -> Result<(StatusCode, HeaderMap, Json<AuthResponse>), ApiError> {
    validate_signup(&req)?;

    let hashed = hash_password(&req.password).map_err(|e| {
        tracing::error!(error = %e, "password hashing failed");
        api_error(StatusCode::INTERNAL_SERVER_ERROR, "internal server error")
    })?;

    let email = req.email.trim().to_lowercase();
    let user = users::create(&state.pool, &email, req.name.trim(), &hashed)
        .await
        .map_err(store_error)?;

    let (headers, body) = issue_session(&state, user)?;
    Ok((StatusCode::CREATED, headers, body))
}

/// Authenticate with email and password.
#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = AuthResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse)
    )
)]
pub async fn login(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> Result<(HeaderMap, Json<AuthResponse>), ApiError> {
    let email = req.email.trim().to_lowercase();
    let user = users::find_by_email(&state.pool, &email)
        .await
        .map_err(store_error)?;

    // Same response whether the email is unknown or the password is wrong.
    let user = match user {
        Some(u) if verify_password(&req.password, &u.hashed_password) => u,
        _ => {
            return Err(api_error(
                StatusCode::UNAUTHORIZED,
                "incorrect email or password",
            ))
        }
    };

    tracing::info!(user_id = %user.id, "user logged in");
    issue_session(&state, user)
}

/// Clear the session cookie.
#[utoipa::path(
    post,
    path = "/auth/logout",
    tag = "auth",
    responses(
        (status = 200, description = "Logged out", body = LogoutResponse)
    )
)]
pub async fn logout() -> (HeaderMap, Json<LogoutResponse>) {
    let mut headers = HeaderMap::new();
    if let Ok(value) = clear_auth_cookie().parse() {
        headers.insert(header::SET_COOKIE, value);
    }
    (
        headers,
        Json(LogoutResponse {
            message: "logged out",
        }),
    )
}
