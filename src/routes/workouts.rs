// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Workout library.

use crate::error::Result;
use crate::middleware::{authorize, AuthUser};
use crate::models::{CoolDownExercise, Role, Workout};
use crate::services::workouts::{CategoryCount, WorkoutListing};
use crate::services::{CoolDownCatalogue, SeedReport, WorkoutFilter, WorkoutForm};
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;

const WRITERS: &[Role] = &[Role::Coach, Role::Admin];

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/workouts", get(list_workouts).post(create_workout))
        .route("/api/workouts/categories", get(list_categories))
        .route("/api/workouts/seed", post(seed_workouts))
        .route(
            "/api/workouts/{id}",
            get(get_workout).put(update_workout).delete(delete_workout),
        )
        .route("/api/exercises", get(list_exercises))
        .route("/api/cool-downs", get(list_cool_downs))
        .route("/api/cool-downs/routines/{key}", get(get_cool_down_routine))
}

#[derive(Deserialize)]
struct CoolDownFilter {
    category: Option<String>,
}

async fn list_workouts(
    State(state): State<Arc<AppState>>,
    Query(filter): Query<WorkoutFilter>,
) -> Result<Json<WorkoutListing>> {
    Ok(Json(state.workouts.list(&filter).await?))
}

async fn get_workout(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Workout>> {
    Ok(Json(state.workouts.get(&id).await?))
}

async fn create_workout(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(form): Json<WorkoutForm>,
) -> Result<(StatusCode, Json<Workout>)> {
    authorize(&state, &user, WRITERS).await?;
    let workout = state.workouts.create(form, &user.uid).await?;
    Ok((StatusCode::CREATED, Json(workout)))
}

async fn update_workout(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    Json(form): Json<WorkoutForm>,
) -> Result<Json<Workout>> {
    authorize(&state, &user, WRITERS).await?;
    Ok(Json(state.workouts.update(&id, form).await?))
}

async fn delete_workout(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    authorize(&state, &user, WRITERS).await?;
    state.workouts.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_categories(State(state): State<Arc<AppState>>) -> Result<Json<Vec<CategoryCount>>> {
    Ok(Json(state.workouts.categories().await?))
}

async fn list_exercises(State(state): State<Arc<AppState>>) -> Result<Json<Vec<String>>> {
    Ok(Json(state.workouts.exercise_names().await?))
}

async fn seed_workouts(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<SeedReport>> {
    authorize(&state, &user, &[Role::Admin]).await?;
    Ok(Json(state.workouts.seed(&user.uid).await?))
}

async fn list_cool_downs(
    Query(filter): Query<CoolDownFilter>,
) -> Result<Json<Vec<CoolDownExercise>>> {
    let catalogue = CoolDownCatalogue::load()?;
    Ok(Json(catalogue.by_category(filter.category.as_deref())))
}

async fn get_cool_down_routine(Path(key): Path<String>) -> Result<Json<Vec<CoolDownExercise>>> {
    Ok(Json(CoolDownCatalogue::load()?.routine(&key)?))
}
