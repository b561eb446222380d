// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Message board: posts, replies, likes and per-category summaries.
//!
//! Post likes and reply appends use the store's atomic array operations.
//! Reply likes rewrite the whole `replies` array and can lose a concurrent
//! update to the same post.

use crate::db::{collections, get_as, list_as, to_fields, Direction, DocumentStore, Fields, Query};
use crate::error::{AppError, Result};
use crate::models::{Post, PostCategory, Reply, UserProfile};
use crate::time_utils::now_rfc3339;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::Validate;

const ANONYMOUS: &str = "Anonymous";

fn default_category() -> String {
    PostCategory::General.value().to_string()
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PostForm {
    #[serde(default)]
    #[validate(custom(function = "validate_not_blank", message = "Title is required"))]
    pub title: String,
    #[serde(default)]
    #[validate(custom(function = "validate_not_blank", message = "Message is required"))]
    pub content: String,
    #[serde(default = "default_category")]
    pub category: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ReplyForm {
    #[serde(default)]
    #[validate(custom(function = "validate_not_blank", message = "Reply cannot be empty"))]
    pub content: String,
}

/// Rejects empty and whitespace-only text.
pub(crate) fn validate_not_blank(value: &str) -> std::result::Result<(), validator::ValidationError> {
    if value.trim().is_empty() {
        let mut err = validator::ValidationError::new("blank");
        err.message = Some("Cannot be empty".into());
        return Err(err);
    }
    Ok(())
}

/// Whether the caller now likes the item, and the stored count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct LikeState {
    pub liked: bool,
    pub likes_count: i64,
}

// ─── Aggregation ─────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct CategorySummary {
    pub category: String,
    pub label: String,
    pub description: String,
    pub post_count: usize,
    pub reply_count: usize,
    pub latest_post: Option<Post>,
}

/// Summarize `posts` by category.
///
/// Every known category is present, in display order. Categories that are
/// not known follow in order of first appearance, labelled with their raw
/// value.
pub fn category_summaries(posts: &[Post]) -> Vec<CategorySummary> {
    let mut order: Vec<(String, String, String)> = PostCategory::ALL
        .into_iter()
        .map(|c| {
            (
                c.value().to_string(),
                c.label().to_string(),
                c.description().to_string(),
            )
        })
        .collect();
    for post in posts {
        if !order.iter().any(|(value, _, _)| *value == post.category) {
            order.push((post.category.clone(), post.category.clone(), String::new()));
        }
    }

    order
        .into_iter()
        .map(|(category, label, description)| {
            let in_category: Vec<&Post> =
                posts.iter().filter(|p| p.category == category).collect();
            let mut latest: Option<&Post> = None;
            for post in &in_category {
                if latest.map_or(true, |l| post.created_at > l.created_at) {
                    latest = Some(post);
                }
            }
            CategorySummary {
                post_count: in_category.len(),
                reply_count: in_category.iter().map(|p| p.replies.len()).sum(),
                latest_post: latest.cloned(),
                category,
                label,
                description,
            }
        })
        .collect()
}

fn author_name(profile: Option<&UserProfile>) -> String {
    profile
        .map(|p| p.display_name.trim())
        .filter(|n| !n.is_empty())
        .unwrap_or(ANONYMOUS)
        .to_string()
}

// ─── Service ─────────────────────────────────────────────────

#[derive(Clone)]
pub struct MessageBoard {
    store: Arc<dyn DocumentStore>,
}

impl MessageBoard {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Posts newest first, optionally limited to one category.
    ///
    /// The category is filtered after the ordered read so the query needs
    /// no composite index.
    pub async fn list(&self, category: Option<&str>) -> Result<Vec<Post>> {
        let query = Query::all().order_by("createdAt", Direction::Descending);
        let mut posts: Vec<Post> = list_as(self.store.as_ref(), collections::POSTS, query).await?;
        if let Some(category) = category.filter(|c| !c.is_empty() && *c != "all") {
            posts.retain(|p| p.category == category);
        }
        Ok(posts)
    }

    pub async fn categories(&self) -> Result<Vec<CategorySummary>> {
        Ok(category_summaries(&self.list(None).await?))
    }

    pub async fn get(&self, post_id: &str) -> Result<Post> {
        get_as::<Post>(self.store.as_ref(), collections::POSTS, post_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Post {}", post_id)))
    }

    pub async fn create(
        &self,
        form: PostForm,
        author_id: &str,
        author: Option<&UserProfile>,
    ) -> Result<Post> {
        form.validate()?;

        let mut post = Post {
            title: form.title,
            content: form.content,
            category: form.category,
            author_id: author_id.to_string(),
            author_name: author_name(author),
            created_at: now_rfc3339(),
            ..Default::default()
        };
        post.id = self
            .store
            .add(collections::POSTS, to_fields(&post)?)
            .await?;

        tracing::info!(post_id = %post.id, category = %post.category, "Post created");
        Ok(post)
    }

    /// Toggle the caller's like on a post.
    pub async fn toggle_post_like(&self, post_id: &str, uid: &str) -> Result<LikeState> {
        let post = self.get(post_id).await?;
        let liked = post.likes.iter().any(|id| id == uid);
        let element = vec![Value::String(uid.to_string())];

        if liked {
            self.store
                .array_remove(collections::POSTS, post_id, "likes", element)
                .await?;
        } else {
            self.store
                .array_union(collections::POSTS, post_id, "likes", element)
                .await?;
        }
        let delta = if liked { -1 } else { 1 };
        self.store
            .increment(collections::POSTS, post_id, "likesCount", delta)
            .await
            .map_err(|e| {
                tracing::error!(post_id, error = %e, "Like recorded but count not updated");
                AppError::from(e)
            })?;

        tracing::debug!(post_id, uid, liked = !liked, "Post like toggled");
        Ok(LikeState {
            liked: !liked,
            likes_count: post.likes_count + delta,
        })
    }

    pub async fn add_reply(
        &self,
        post_id: &str,
        form: ReplyForm,
        author_id: &str,
        author: Option<&UserProfile>,
    ) -> Result<Reply> {
        form.validate()?;
        if self
            .store
            .get(collections::POSTS, post_id)
            .await?
            .is_none()
        {
            return Err(AppError::NotFound(format!("Post {}", post_id)));
        }

        let reply = Reply {
            id: uuid::Uuid::new_v4().to_string(),
            content: form.content,
            author_id: author_id.to_string(),
            author_name: author_name(author),
            created_at: now_rfc3339(),
            ..Default::default()
        };
        self.store
            .array_union(
                collections::POSTS,
                post_id,
                "replies",
                vec![serde_json::to_value(&reply).map_err(anyhow::Error::from)?],
            )
            .await
            .map_err(|e| {
                tracing::error!(post_id, error = %e, "Failed to add reply");
                AppError::from(e)
            })?;

        tracing::info!(post_id, reply_id = %reply.id, "Reply added");
        Ok(reply)
    }

    /// Toggle the caller's like on one reply by rewriting `replies`.
    pub async fn toggle_reply_like(
        &self,
        post_id: &str,
        reply_id: &str,
        uid: &str,
    ) -> Result<LikeState> {
        let mut post = self.get(post_id).await?;
        let reply = post
            .replies
            .iter_mut()
            .find(|r| r.id == reply_id)
            .ok_or_else(|| AppError::NotFound(format!("Reply {}", reply_id)))?;

        let liked = reply.likes.iter().any(|id| id == uid);
        if liked {
            reply.likes.retain(|id| id != uid);
            reply.likes_count -= 1;
        } else {
            reply.likes.push(uid.to_string());
            reply.likes_count += 1;
        }
        let state = LikeState {
            liked: !liked,
            likes_count: reply.likes_count,
        };

        let mut fields = Fields::new();
        fields.insert(
            "replies".to_string(),
            serde_json::to_value(&post.replies).map_err(anyhow::Error::from)?,
        );
        self.store
            .update_fields(collections::POSTS, post_id, fields)
            .await?;

        tracing::debug!(post_id, reply_id, uid, liked = state.liked, "Reply like toggled");
        Ok(state)
    }
}
