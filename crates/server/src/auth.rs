//! JWT issuing/verification, password hashing, and the request extractor
//! that authenticates every protected endpoint.
//!
//! Tokens travel in the `access_token` httpOnly cookie set by the auth
//! endpoints, with an `Authorization: Bearer` header fallback for API
//! clients.

use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::{header, StatusCode};
use axum::Json;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use taskdeck_core::config::AuthConfig;

use crate::api::ErrorResponse;
use crate::state::AppState;

pub const ACCESS_TOKEN_COOKIE: &str = "access_token";

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: String,
    /// Issued at (unix seconds)
    pub iat: i64,
    /// Expiration (unix seconds)
    pub exp: i64,
}

// ── Passwords ─────────────────────────────────────────────────

pub fn hash_password(password: &str) -> Result<String, bcrypt::BcryptError> {
    bcrypt::hash(password, bcrypt::DEFAULT_COST)
}

pub fn verify_password(password: &str, hashed: &str) -> bool {
    bcrypt::verify(password, hashed).unwrap_or(false)
}

// ── Tokens ────────────────────────────────────────────────────

pub fn create_access_token(
    user_id: Uuid,
    auth: &AuthConfig,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now();
    let claims = Claims {
        sub: user_id.to_string(),
        iat: now.timestamp(),
        exp: (now + Duration::hours(auth.jwt_expiration_hours as i64)).timestamp(),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(auth.jwt_secret.as_bytes()),
    )
}

/// Decode a token and extract the user id. Any failure (bad signature,
/// expired, malformed sub) yields `None`.
pub fn decode_user_id(token: &str, secret: &str) -> Option<Uuid> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .ok()?;
    data.claims.sub.parse().ok()
}

// ── Cookies ───────────────────────────────────────────────────

/// `Set-Cookie` value installing the access token.
pub fn auth_cookie(token: &str, max_age_secs: u64) -> String {
    format!(
        "{}={}; HttpOnly; SameSite=Lax; Path=/; Max-Age={}",
        ACCESS_TOKEN_COOKIE, token, max_age_secs
    )
}

/// `Set-Cookie` value clearing the access token.
pub fn clear_auth_cookie() -> String {
    format!(
        "{}=; HttpOnly; SameSite=Lax; Path=/; Max-Age=0",
        ACCESS_TOKEN_COOKIE
    )
}

fn token_from_cookie_header(cookie_header: &str) -> Option<&str> {
    cookie_header
        .split(';')
        .map(str::trim)
        .find_map(|pair| {
            pair.strip_prefix(ACCESS_TOKEN_COOKIE)
                .and_then(|rest| rest.strip_prefix('='))
        })
        .map(strip_bearer)
        .filter(|t| !t.is_empty())
}

/// Accept both bare tokens and "Bearer "-prefixed values.
fn strip_bearer(value: &str) -> &str {
    value.strip_prefix("Bearer ").unwrap_or(value)
}

fn extract_token(parts: &Parts) -> Option<String> {
    // Cookie first (set by the auth endpoints), then Authorization header.
    if let Some(cookie) = parts
        .headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
    {
        if let Some(token) = token_from_cookie_header(cookie) {
            return Some(token.to_string());
        }
    }

    parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .filter(|t| !t.is_empty())
        .map(String::from)
}

// ── Extractor ─────────────────────────────────────────────────

/// Authenticated user id, extracted from the request's JWT.
pub struct AuthUser(pub Uuid);

type AuthRejection = (
    StatusCode,
    [(header::HeaderName, &'static str); 1],
    Json<ErrorResponse>,
);

fn credentials_rejection() -> AuthRejection {
    (
        StatusCode::UNAUTHORIZED,
        [(header::WWW_AUTHENTICATE, "Bearer")],
        Json(ErrorResponse {
            error: "could not validate credentials".to_string(),
        }),
    )
}

impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = extract_token(parts).ok_or_else(credentials_rejection)?;
        let user_id = decode_user_id(&token, &state.config.auth.jwt_secret)
            .ok_or_else(credentials_rejection)?;
        Ok(AuthUser(user_id))
    }
}
