// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Message board.

use crate::error::Result;
use crate::middleware::AuthUser;
use crate::models::{Post, Reply};
use crate::services::{CategorySummary, LikeState, PostForm, ReplyForm};
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/posts", get(list_posts).post(create_post))
        .route("/api/posts/categories", get(list_categories))
        .route("/api/posts/{id}", get(get_post))
        .route("/api/posts/{id}/like", post(like_post))
        .route("/api/posts/{id}/replies", post(add_reply))
        .route("/api/posts/{id}/replies/{reply_id}/like", post(like_reply))
}

#[derive(Debug, Deserialize)]
pub struct PostsQuery {
    pub category: Option<String>,
}

async fn list_posts(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PostsQuery>,
) -> Result<Json<Vec<Post>>> {
    Ok(Json(state.board.list(params.category.as_deref()).await?))
}

async fn list_categories(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<CategorySummary>>> {
    Ok(Json(state.board.categories().await?))
}

async fn get_post(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Post>> {
    Ok(Json(state.board.get(&id).await?))
}

async fn create_post(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(form): Json<PostForm>,
) -> Result<(StatusCode, Json<Post>)> {
    let author = state.profiles.fetch(&user.uid).await.ok().flatten();
    let post = state.board.create(form, &user.uid, author.as_ref()).await?;
    Ok((StatusCode::CREATED, Json(post)))
}

async fn like_post(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<LikeState>> {
    Ok(Json(state.board.toggle_post_like(&id, &user.uid).await?))
}

async fn add_reply(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    Json(form): Json<ReplyForm>,
) -> Result<(StatusCode, Json<Reply>)> {
    let author = state.profiles.fetch(&user.uid).await.ok().flatten();
    let reply = state
        .board
        .add_reply(&id, form, &user.uid, author.as_ref())
        .await?;
    Ok((StatusCode::CREATED, Json(reply)))
}

async fn like_reply(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path((id, reply_id)): Path<(String, String)>,
) -> Result<Json<LikeState>> {
    Ok(Json(
        state
            .board
            .toggle_reply_like(&id, &reply_id, &user.uid)
            .await?,
    ))
}
