// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Bearer-token authentication and role checks.
//!
//! Tokens are issued by the external auth service and signed with the
//! shared HS256 key. `sub` carries the member's uid.

use crate::error::AppError;
use crate::models::{Role, UserProfile};
use crate::AppState;
use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Cookie checked before the `Authorization` header.
pub const TOKEN_COOKIE: &str = "portal_token";

/// JWT claims structure.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (member uid)
    pub sub: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Expiration time (Unix timestamp)
    pub exp: usize,
    /// Issued at (Unix timestamp)
    pub iat: usize,
}

/// Authenticated caller extracted from the token.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthUser {
    pub uid: String,
    pub email: Option<String>,
}

fn bearer_token(request: &Request) -> Option<String> {
    request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(|t| t.trim().to_string())
}

/// Middleware that requires valid JWT authentication.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = match jar.get(TOKEN_COOKIE) {
        Some(cookie) => cookie.value().to_string(),
        None => bearer_token(&request).ok_or(AppError::Unauthorized)?,
    };

    let key = DecodingKey::from_secret(&state.config.jwt_signing_key);
    let validation = Validation::new(Algorithm::HS256);

    let claims = decode::<Claims>(&token, &key, &validation)
        .map_err(|e| {
            tracing::debug!(error = %e, "Rejected token");
            AppError::InvalidToken
        })?
        .claims;
    if claims.sub.trim().is_empty() {
        return Err(AppError::InvalidToken);
    }

    request.extensions_mut().insert(AuthUser {
        uid: claims.sub,
        email: claims.email,
    });

    Ok(next.run(request).await)
}

/// Resolve the caller's profile and require one of `roles`.
///
/// A profile that cannot be read counts as a member.
pub async fn authorize(
    state: &AppState,
    user: &AuthUser,
    roles: &[Role],
) -> Result<UserProfile, AppError> {
    let profile = state.profiles.resolve(&user.uid).await;
    if roles.contains(&profile.role) {
        return Ok(profile);
    }
    tracing::warn!(uid = %user.uid, role = %profile.role, "Insufficient role");
    Err(AppError::Forbidden(format!(
        "requires {}",
        roles
            .iter()
            .map(Role::to_string)
            .collect::<Vec<_>>()
            .join(" or ")
    )))
}

/// Create a JWT for a member. Used by tests and local tooling.
pub fn create_jwt(uid: &str, email: Option<&str>, signing_key: &[u8]) -> anyhow::Result<String> {
    use jsonwebtoken::{encode, EncodingKey, Header};
    use std::time::{SystemTime, UNIX_EPOCH};

    let now = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs() as usize;

    let claims = Claims {
        sub: uid.to_string(),
        email: email.map(str::to_string),
        iat: now,
        exp: now + 24 * 60 * 60, // 1 day
    };

    Ok(encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(signing_key),
    )?)
}
