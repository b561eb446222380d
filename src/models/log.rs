// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Personal workout log model.

use crate::models::lenient;
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// A member's record of a completed workout, stored in `logs`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutLog {
    #[serde(default)]
    pub id: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub workout_name: String,
    /// `YYYY-MM-DD`
    #[serde(default, deserialize_with = "lenient::string")]
    pub date: String,
    #[serde(default, deserialize_with = "lenient::null_default")]
    pub exercises: Vec<LoggedExercise>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub notes: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub user_id: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub created_at: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct LoggedExercise {
    #[serde(default, deserialize_with = "lenient::string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub sets: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub reps: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub weight: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub notes: String,
}
