// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Calendar events and training days.

use crate::error::Result;
use crate::middleware::{authorize, AuthUser};
use crate::models::{Event, Role};
use crate::services::{EventDetails, EventForm, TrainingDay};
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Extension, Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/events", get(list_events).post(create_event))
        .route(
            "/api/events/{id}",
            get(get_event).put(update_event).delete(delete_event),
        )
        .route("/api/days/{date}", get(get_training_day))
}

#[derive(Debug, Deserialize)]
pub struct EventsQuery {
    /// Only events starting on this day (`YYYY-MM-DD`)
    pub day: Option<String>,
}

async fn list_events(
    State(state): State<Arc<AppState>>,
    Query(params): Query<EventsQuery>,
) -> Result<Json<Vec<Event>>> {
    let events = match params.day.as_deref().filter(|d| !d.is_empty()) {
        Some(day) => state.events.events_on(day).await?,
        None => state.events.list().await?,
    };
    Ok(Json(events))
}

async fn get_event(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<EventDetails>> {
    Ok(Json(state.events.details(&id).await?))
}

async fn create_event(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(form): Json<EventForm>,
) -> Result<(StatusCode, Json<Event>)> {
    authorize(&state, &user, &[Role::Admin]).await?;
    let event = state.events.create(form, &user.uid).await?;
    Ok((StatusCode::CREATED, Json(event)))
}

async fn update_event(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    Json(form): Json<EventForm>,
) -> Result<Json<Event>> {
    authorize(&state, &user, &[Role::Admin]).await?;
    Ok(Json(state.events.update(&id, form).await?))
}

async fn delete_event(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    authorize(&state, &user, &[Role::Admin]).await?;
    state.events.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn get_training_day(
    State(state): State<Arc<AppState>>,
    Path(date): Path<String>,
) -> Result<Json<TrainingDay>> {
    Ok(Json(state.events.training_day(&date).await?))
}
