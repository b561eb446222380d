// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Event leaderboards.

use crate::error::Result;
use crate::middleware::{authorize, AuthUser};
use crate::models::{BoardKind, Leaderboard, LockerWod, Role};
use crate::services::{EntryInput, LeaderboardWrite, RankedEntry};
use crate::AppState;
use axum::{
    extract::{Path, State},
    routing::{delete, get, post},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/api/events/{id}/leaderboards",
            get(get_leaderboards).put(save_leaderboards),
        )
        .route("/api/events/{id}/leaderboards/{board}/entries", post(add_entry))
        .route(
            "/api/events/{id}/leaderboards/{board}/entries/{entry_id}",
            delete(remove_entry),
        )
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardsResponse {
    pub event_id: String,
    /// Pass back as `baseVersion` when saving
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub version: u64,
    pub main: Vec<RankedEntry>,
    pub locker: Vec<RankedEntry>,
    pub locker_wod: Option<LockerWod>,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct BoardResponse {
    pub board: BoardKind,
    pub entries: Vec<RankedEntry>,
}

impl BoardResponse {
    fn new(board: BoardKind, leaderboard: &Leaderboard) -> Self {
        Self {
            board,
            entries: leaderboard.ranked(),
        }
    }
}

/// Wholesale replacement of both boards.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveLeaderboardsRequest {
    #[serde(default)]
    pub main_leaderboard: Leaderboard,
    #[serde(default)]
    pub locker_wod_leaderboard: Leaderboard,
    /// Version read by the editor. Checked only under the version-checked
    /// commit policy.
    #[serde(default)]
    pub base_version: u64,
}

async fn get_leaderboards(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<LeaderboardsResponse>> {
    let event = state.events.get(&id).await?;
    Ok(Json(LeaderboardsResponse {
        main: event.main_leaderboard.ranked(),
        locker: event.locker_wod_leaderboard.ranked(),
        locker_wod: event.populated_locker_wod().cloned(),
        version: event.version,
        event_id: event.id,
    }))
}

async fn save_leaderboards(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    Json(request): Json<SaveLeaderboardsRequest>,
) -> Result<Json<LeaderboardsResponse>> {
    authorize(&state, &user, &[Role::Admin]).await?;

    let mut write = LeaderboardWrite {
        event_id: id,
        main: request.main_leaderboard,
        locker: request.locker_wod_leaderboard,
        base_version: request.base_version,
    };
    write.normalize();
    let version = state.leaderboards.save(write.clone()).await?;

    Ok(Json(LeaderboardsResponse {
        event_id: write.event_id,
        version,
        main: write.main.ranked(),
        locker: write.locker.ranked(),
        locker_wod: None,
    }))
}

async fn add_entry(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path((id, board)): Path<(String, BoardKind)>,
    Json(input): Json<EntryInput>,
) -> Result<Json<BoardResponse>> {
    authorize(&state, &user, &[Role::Admin]).await?;
    let leaderboard = state.leaderboards.quick_add(&id, board, input).await?;
    Ok(Json(BoardResponse::new(board, &leaderboard)))
}

async fn remove_entry(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path((id, board, entry_id)): Path<(String, BoardKind, String)>,
) -> Result<Json<BoardResponse>> {
    authorize(&state, &user, &[Role::Admin]).await?;
    let leaderboard = state.leaderboards.quick_remove(&id, board, &entry_id).await?;
    Ok(Json(BoardResponse::new(board, &leaderboard)))
}
