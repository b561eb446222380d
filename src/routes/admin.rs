// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Admin dashboard and gym announcements.

use crate::error::Result;
use crate::middleware::{authorize, AuthUser};
use crate::models::{Announcement, Role, UserProfile};
use crate::services::profiles::LOGIN_WINDOW_DAYS;
use crate::services::{AdminOverview, AnnouncementForm, MemberDetail};
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, put},
    Extension, Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/admin/overview", get(get_overview))
        .route("/api/admin/members", get(list_members))
        .route("/api/admin/members/{uid}", get(get_member))
        .route("/api/admin/members/{uid}/role", put(set_role))
        .route(
            "/api/announcements",
            get(list_announcements).post(create_announcement),
        )
        .route("/api/announcements/{id}", delete(delete_announcement))
}

// ─── Members ─────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct OverviewQuery {
    /// Window for per-member login counts, in days
    pub days: Option<i64>,
}

async fn get_overview(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(params): Query<OverviewQuery>,
) -> Result<Json<AdminOverview>> {
    authorize(&state, &user, &[Role::Admin]).await?;
    let days = params
        .days
        .filter(|d| *d > 0)
        .unwrap_or(LOGIN_WINDOW_DAYS);
    Ok(Json(state.profiles.overview(days).await?))
}

async fn list_members(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<UserProfile>>> {
    authorize(&state, &user, &[Role::Admin]).await?;
    Ok(Json(state.profiles.list_members().await?))
}

async fn get_member(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(uid): Path<String>,
) -> Result<Json<MemberDetail>> {
    authorize(&state, &user, &[Role::Admin]).await?;
    Ok(Json(state.profiles.member_detail(&uid).await?))
}

#[derive(Debug, Deserialize)]
pub struct SetRoleRequest {
    pub role: Role,
}

async fn set_role(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(uid): Path<String>,
    Json(request): Json<SetRoleRequest>,
) -> Result<Json<UserProfile>> {
    authorize(&state, &user, &[Role::Admin]).await?;
    Ok(Json(state.profiles.set_role(&uid, request.role).await?))
}

// ─── Announcements ───────────────────────────────────────────

async fn list_announcements(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Announcement>>> {
    Ok(Json(state.announcements.list().await?))
}

async fn create_announcement(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(form): Json<AnnouncementForm>,
) -> Result<(StatusCode, Json<Announcement>)> {
    let author = authorize(&state, &user, &[Role::Admin]).await?;
    let announcement = state.announcements.create(form, Some(&author)).await?;
    Ok((StatusCode::CREATED, Json(announcement)))
}

async fn delete_announcement(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    authorize(&state, &user, &[Role::Admin]).await?;
    state.announcements.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
