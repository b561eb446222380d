// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! The caller's own profile, workout logs and login tracking.

use crate::error::{AppError, Result};
use crate::middleware::AuthUser;
use crate::models::{UserProfile, WorkoutLog};
use crate::services::{LogForm, ProfileUpdate};
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post},
    Extension, Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/me", get(get_me).put(update_me).post(create_me))
        .route("/api/sessions", post(track_session))
        .route("/api/logs", get(list_logs).post(create_log))
        .route("/api/logs/{id}", delete(delete_log))
}

// ─── Profile ─────────────────────────────────────────────────

/// Sign-up details. The email comes from the token.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProfileRequest {
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// Unlike role checks, this surfaces fetch errors and timeouts.
async fn get_me(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<UserProfile>> {
    let profile = state
        .profiles
        .fetch(&user.uid)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Profile {}", user.uid)))?;
    Ok(Json(profile))
}

async fn create_me(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<CreateProfileRequest>,
) -> Result<(StatusCode, Json<UserProfile>)> {
    let email = user
        .email
        .clone()
        .or(request.email)
        .unwrap_or_default();
    let profile = state
        .profiles
        .create(&user.uid, &email, &request.display_name)
        .await?;
    Ok((StatusCode::CREATED, Json(profile)))
}

async fn update_me(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(update): Json<ProfileUpdate>,
) -> Result<Json<UserProfile>> {
    Ok(Json(state.profiles.update(&user.uid, update).await?))
}

async fn track_session(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> StatusCode {
    state.profiles.track_login(&user.uid).await;
    StatusCode::NO_CONTENT
}

// ─── Workout Logs ────────────────────────────────────────────

async fn list_logs(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<WorkoutLog>>> {
    Ok(Json(state.logs.list_for(&user.uid).await?))
}

async fn create_log(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(form): Json<LogForm>,
) -> Result<(StatusCode, Json<WorkoutLog>)> {
    let log = state.logs.create(form, &user.uid).await?;
    Ok((StatusCode::CREATED, Json(log)))
}

async fn delete_log(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    state.logs.delete(&id, &user.uid).await?;
    Ok(StatusCode::NO_CONTENT)
}
