// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use crate::db::{collections, get_as, list_as, to_fields, DocumentStore, Query};
use crate::error::{AppError, Result};
use crate::models::{LoggedExercise, WorkoutLog};
use crate::time_utils::now_rfc3339;
use serde::Deserialize;
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::{Validate, ValidationError};

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct LogForm {
    #[serde(default)]
    #[validate(length(min = 1, message = "Workout name is required"))]
    pub workout_name: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "Date is required"))]
    pub date: String,
    #[serde(default)]
    #[validate(custom(function = "validate_logged_exercises"))]
    pub exercises: Vec<LoggedExercise>,
    #[serde(default)]
    pub notes: String,
}

fn validate_logged_exercises(exercises: &[LoggedExercise]) -> std::result::Result<(), ValidationError> {
    let message = if exercises.is_empty() {
        "At least one exercise is required"
    } else if exercises.iter().any(|e| e.name.trim().is_empty()) {
        "Exercise name is required"
    } else {
        return Ok(());
    };
    let mut err = ValidationError::new("exercises");
    err.message = Some(message.into());
    Err(err)
}

/// A member's own workout history.
#[derive(Clone)]
pub struct WorkoutLogService {
    store: Arc<dyn DocumentStore>,
}

impl WorkoutLogService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// `uid`'s logs, most recent workout date first.
    /// The member's logs, newest date first. Sorted here so the query needs
    /// no composite index.
    pub async fn list_for(&self, uid: &str) -> Result<Vec<WorkoutLog>> {
        let query = Query::all().filter_eq("userId", uid);
        let mut logs: Vec<WorkoutLog> = list_as(self.store.as_ref(), collections::LOGS, query).await?;
        logs.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(logs)
    }

    pub async fn create(&self, form: LogForm, uid: &str) -> Result<WorkoutLog> {
        form.validate()?;

        let mut log = WorkoutLog {
            workout_name: form.workout_name.trim().to_string(),
            date: form.date,
            exercises: form.exercises,
            notes: form.notes,
            user_id: uid.to_string(),
            created_at: now_rfc3339(),
            ..Default::default()
        };
        log.id = self.store.add(collections::LOGS, to_fields(&log)?).await?;

        tracing::info!(log_id = %log.id, uid, "Workout logged");
        Ok(log)
    }

    /// Delete one of the caller's own logs.
    pub async fn delete(&self, log_id: &str, uid: &str) -> Result<()> {
        let log = get_as::<WorkoutLog>(self.store.as_ref(), collections::LOGS, log_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Log {}", log_id)))?;
        if log.user_id != uid {
            tracing::warn!(log_id, uid, owner = %log.user_id, "Refusing to delete another member's log");
            return Err(AppError::Forbidden("Logs can only be deleted by their owner".to_string()));
        }

        self.store.delete(collections::LOGS, log_id).await?;
        tracing::info!(log_id, uid, "Workout log deleted");
        Ok(())
    }
}
