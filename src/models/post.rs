// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Message board posts and replies.

use crate::models::lenient;
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// A thread stored in the `messageboard` collection.
///
/// `likes_count` is maintained next to `likes` and may drift from its length.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    #[serde(default)]
    pub id: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub title: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub content: String,
    /// Category value. Usually one of [`PostCategory`], but stored as text.
    #[serde(default, deserialize_with = "lenient::string")]
    pub category: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub author_id: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub author_name: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub created_at: String,
    #[serde(default, deserialize_with = "lenient::null_default")]
    pub likes: Vec<String>,
    #[serde(default, deserialize_with = "lenient::null_default")]
    pub likes_count: i64,
    #[serde(default, deserialize_with = "lenient::null_default")]
    pub replies: Vec<Reply>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct Reply {
    #[serde(default, deserialize_with = "lenient::string")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub content: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub author_id: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub author_name: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub created_at: String,
    #[serde(default, deserialize_with = "lenient::null_default")]
    pub likes: Vec<String>,
    #[serde(default, deserialize_with = "lenient::null_default")]
    pub likes_count: i64,
}

/// Categories the board always shows, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "kebab-case")]
pub enum PostCategory {
    General,
    WorkoutTips,
    Nutrition,
    Progress,
    Questions,
}

impl PostCategory {
    pub const ALL: [PostCategory; 5] = [
        PostCategory::General,
        PostCategory::WorkoutTips,
        PostCategory::Nutrition,
        PostCategory::Progress,
        PostCategory::Questions,
    ];

    pub fn value(self) -> &'static str {
        match self {
            PostCategory::General => "general",
            PostCategory::WorkoutTips => "workout-tips",
            PostCategory::Nutrition => "nutrition",
            PostCategory::Progress => "progress",
            PostCategory::Questions => "questions",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PostCategory::General => "General Discussion",
            PostCategory::WorkoutTips => "Workout Tips",
            PostCategory::Nutrition => "Nutrition",
            PostCategory::Progress => "Progress & Achievements",
            PostCategory::Questions => "Questions & Help",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            PostCategory::General => "Chat about anything gym or fitness related",
            PostCategory::WorkoutTips => "Share and discover effective workout techniques",
            PostCategory::Nutrition => "Discuss meal plans, recipes, and diet advice",
            PostCategory::Progress => "Celebrate your fitness journey and milestones",
            PostCategory::Questions => "Ask questions and get help from the community",
        }
    }

    pub fn from_value(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.value() == value)
    }
}
