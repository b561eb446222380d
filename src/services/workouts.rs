// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Workout library.

use crate::db::{collections, get_as, list_as, to_fields, DocumentStore, Query};
use crate::error::{AppError, Result};
use crate::models::{Exercise, Workout, WorkoutCategory};
use crate::services::seed::{self, SEED_SOURCE};
use crate::time_utils::now_rfc3339;
use futures_util::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::{Validate, ValidationError};

/// Concurrent inserts while seeding.
const SEED_CONCURRENCY: usize = 8;

/// Workout as submitted by a coach or admin.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutForm {
    #[serde(default)]
    #[validate(length(min = 1, message = "Workout name is required"))]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: WorkoutCategory,
    #[serde(default)]
    #[validate(custom(function = "validate_exercises"))]
    pub exercises: Vec<Exercise>,
}

fn validate_exercises(exercises: &[Exercise]) -> std::result::Result<(), ValidationError> {
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

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WorkoutFields {
    name: String,
    description: String,
    category: WorkoutCategory,
    exercises: Vec<Exercise>,
}

impl From<WorkoutForm> for WorkoutFields {
    fn from(form: WorkoutForm) -> Self {
        Self {
            name: form.name.trim().to_string(),
            description: form.description,
            category: form.category,
            exercises: form.exercises,
        }
    }
}

/// Listing filter. A missing or `all` category matches everything.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WorkoutFilter {
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub search: Option<String>,
}

impl WorkoutFilter {
    fn category(&self) -> Option<WorkoutCategory> {
        match self.category.as_deref().map(str::trim) {
            None | Some("") | Some("all") => None,
            Some(value) => serde_json::from_value(serde_json::Value::String(value.to_string())).ok(),
        }
    }

    fn matches(&self, workout: &Workout) -> bool {
        if let Some(category) = self.category() {
            if workout.category != category {
                return false;
            }
        }
        let Some(query) = self
            .search
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
        else {
            return true;
        };
        let query = query.to_lowercase();
        workout.name.to_lowercase().contains(&query)
            || workout.description.to_lowercase().contains(&query)
            || workout
                .exercises
                .iter()
                .any(|e| e.name.to_lowercase().contains(&query))
    }
}

/// Apply `filter` and sort by case-insensitive name.
pub fn filter_workouts(workouts: Vec<Workout>, filter: &WorkoutFilter) -> Vec<Workout> {
    let mut matched: Vec<Workout> = workouts.into_iter().filter(|w| filter.matches(w)).collect();
    matched.sort_by_cached_key(|w| w.name.to_lowercase());
    matched
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct CategoryCount {
    pub category: WorkoutCategory,
    #[cfg_attr(feature = "binding-generation", ts(type = "string"))]
    pub label: &'static str,
    pub count: usize,
}

/// Workouts per category, for every category.
pub fn category_counts(workouts: &[Workout]) -> Vec<CategoryCount> {
    WorkoutCategory::ALL
        .into_iter()
        .map(|category| CategoryCount {
            category,
            label: category.label(),
            count: workouts.iter().filter(|w| w.category == category).count(),
        })
        .collect()
}

/// Unique exercise names used across `workouts`, sorted.
pub fn exercise_names(workouts: &[Workout]) -> Vec<String> {
    let names: BTreeSet<&str> = workouts
        .iter()
        .flat_map(|w| w.exercises.iter())
        .map(|e| e.name.as_str())
        .filter(|n| !n.is_empty())
        .collect();
    names.into_iter().map(str::to_string).collect()
}

#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct WorkoutListing {
    pub workouts: Vec<Workout>,
    /// Size of the library before filtering
    pub total: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct SeedReport {
    pub added: usize,
    pub skipped: usize,
}

#[derive(Clone)]
pub struct WorkoutLibrary {
    store: Arc<dyn DocumentStore>,
}

impl WorkoutLibrary {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub async fn all(&self) -> Result<Vec<Workout>> {
        Ok(list_as(self.store.as_ref(), collections::WORKOUTS, Query::all()).await?)
    }

    pub async fn list(&self, filter: &WorkoutFilter) -> Result<WorkoutListing> {
        let workouts = self.all().await?;
        let total = workouts.len();
        Ok(WorkoutListing {
            workouts: filter_workouts(workouts, filter),
            total,
        })
    }

    pub async fn get(&self, workout_id: &str) -> Result<Workout> {
        get_as::<Workout>(self.store.as_ref(), collections::WORKOUTS, workout_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Workout {}", workout_id)))
    }

    pub async fn create(&self, form: WorkoutForm, created_by: &str) -> Result<Workout> {
        form.validate()?;
        let fields = WorkoutFields::from(form);

        let mut workout = Workout {
            name: fields.name,
            description: fields.description,
            category: fields.category,
            exercises: fields.exercises,
            created_by: Some(created_by.to_string()),
            created_at: Some(now_rfc3339()),
            ..Default::default()
        };
        workout.id = self
            .store
            .add(collections::WORKOUTS, to_fields(&workout)?)
            .await?;

        tracing::info!(workout_id = %workout.id, name = %workout.name, "Workout created");
        Ok(workout)
    }

    pub async fn update(&self, workout_id: &str, form: WorkoutForm) -> Result<Workout> {
        form.validate()?;
        let mut fields = to_fields(&WorkoutFields::from(form))?;
        fields.insert(
            "updatedAt".to_string(),
            serde_json::Value::String(now_rfc3339()),
        );

        self.store
            .update_fields(collections::WORKOUTS, workout_id, fields)
            .await?;
        tracing::info!(workout_id, "Workout updated");
        self.get(workout_id).await
    }

    /// Delete a workout. Events that reference it keep the dangling id.
    pub async fn delete(&self, workout_id: &str) -> Result<()> {
        self.store.delete(collections::WORKOUTS, workout_id).await?;
        tracing::info!(workout_id, "Workout deleted");
        Ok(())
    }

    pub async fn categories(&self) -> Result<Vec<CategoryCount>> {
        Ok(category_counts(&self.all().await?))
    }

    /// Exercise names from the library and the built-in catalogue.
    pub async fn exercise_names(&self) -> Result<Vec<String>> {
        let mut names: BTreeSet<String> = exercise_names(&self.all().await?).into_iter().collect();
        names.extend(seed::catalogue_exercise_names()?);
        Ok(names.into_iter().collect())
    }

    /// Add every catalogue workout whose name is not in the library yet.
    pub async fn seed(&self, created_by: &str) -> Result<SeedReport> {
        let mut names: HashSet<String> = self.all().await?.into_iter().map(|w| w.name).collect();
        let created_at = now_rfc3339();

        let mut pending = Vec::new();
        let mut skipped = 0;
        for mut workout in seed::catalogue()? {
            if !names.insert(workout.name.clone()) {
                tracing::debug!(name = %workout.name, "Skipping existing workout");
                skipped += 1;
                continue;
            }
            workout.created_by = Some(created_by.to_string());
            workout.created_at = Some(created_at.clone());
            workout.source = Some(SEED_SOURCE.to_string());
            pending.push(to_fields(&workout)?);
        }

        let results: Vec<_> = stream::iter(pending)
            .map(|fields| {
                let store = self.store.clone();
                async move { store.add(collections::WORKOUTS, fields).await }
            })
            .buffer_unordered(SEED_CONCURRENCY)
            .collect()
            .await;

        let added = results.iter().filter(|r| r.is_ok()).count();
        tracing::info!(added, skipped, created_by, "Workout library seeded");

        if let Some(Err(e)) = results.into_iter().find(|r| r.is_err()) {
            tracing::error!(added, error = %e, "Seeding stopped short");
            return Err(e.into());
        }
        Ok(SeedReport { added, skipped })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;

    fn workout(name: &str, category: WorkoutCategory, exercises: &[&str]) -> Workout {
        Workout {
            id: name.to_lowercase(),
            name: name.to_string(),
            description: format!("{} description", name),
            category,
            exercises: exercises
                .iter()
                .map(|e| Exercise {
                    name: e.to_string(),
                    ..Default::default()
                })
                .collect(),
            ..Default::default()
        }
    }

    fn sample() -> Vec<Workout> {
        vec![
            workout("helen", WorkoutCategory::Benchmark, &["Run", "Kettlebell Swings"]),
            workout("Murph", WorkoutCategory::Hero, &["Run", "Pull-ups"]),
            workout("Fran", WorkoutCategory::Benchmark, &["Thrusters", "Pull-ups"]),
            workout("Back Squat 5x5", WorkoutCategory::Strength, &["Back Squat"]),
        ]
    }

    fn names(workouts: &[Workout]) -> Vec<&str> {
        workouts.iter().map(|w| w.name.as_str()).collect()
    }

    #[test]
    fn test_filter_sorts_case_insensitively() {
        let all = filter_workouts(sample(), &WorkoutFilter::default());
        assert_eq!(names(&all), vec!["Back Squat 5x5", "Fran", "helen", "Murph"]);
    }

    #[test]
    fn test_filter_by_category_and_search() {
        let filter = WorkoutFilter {
            category: Some("benchmark".to_string()),
            search: Some("PULL".to_string()),
        };
        assert_eq!(names(&filter_workouts(sample(), &filter)), vec!["Fran"]);

        let filter = WorkoutFilter {
            category: Some("all".to_string()),
            search: Some("murph desc".to_string()),
        };
        assert_eq!(names(&filter_workouts(sample(), &filter)), vec!["Murph"]);
    }

    #[test]
    fn test_category_counts_cover_every_category() {
        let counts = category_counts(&sample());
        assert_eq!(counts.len(), WorkoutCategory::ALL.len());
        let benchmark = counts
            .iter()
            .find(|c| c.category == WorkoutCategory::Benchmark)
            .unwrap();
        assert_eq!(benchmark.count, 2);
        assert_eq!(counts.iter().map(|c| c.count).sum::<usize>(), 4);
    }

    #[test]
    fn test_exercise_names_unique_sorted() {
        assert_eq!(
            exercise_names(&sample()),
            vec!["Back Squat", "Kettlebell Swings", "Pull-ups", "Run", "Thrusters"]
        );
    }

    #[test]
    fn test_form_requires_named_exercise() {
        let mut form = WorkoutForm {
            name: "Cindy".to_string(),
            ..Default::default()
        };
        assert!(form.validate().is_err());

        form.exercises.push(Exercise::default());
        assert!(form.validate().is_err());

        form.exercises[0].name = "Pull-ups".to_string();
        assert!(form.validate().is_ok());
    }

    #[tokio::test]
    async fn test_seed_skips_existing_names() {
        let store = Arc::new(MemoryStore::new());
        let library = WorkoutLibrary::new(store.clone());

        library
            .create(
                WorkoutForm {
                    name: "Fran".to_string(),
                    exercises: vec![Exercise {
                        name: "Thrusters".to_string(),
                        ..Default::default()
                    }],
                    ..Default::default()
                },
                "coach-1",
            )
            .await
            .unwrap();

        let report = library.seed("admin-1").await.unwrap();
        let catalogue_len = seed::catalogue().unwrap().len();
        // "Fran" exists and the catalogue lists "Eva" twice.
        assert_eq!(report.skipped, 2);
        assert_eq!(report.added, catalogue_len - 2);
        assert_eq!(store.count(collections::WORKOUTS), catalogue_len - 1);

        let again = library.seed("admin-1").await.unwrap();
        assert_eq!(again.added, 0);
        assert_eq!(again.skipped, catalogue_len);

        let seeded = library
            .all()
            .await
            .unwrap()
            .into_iter()
            .find(|w| w.name == "Murph")
            .unwrap();
        assert_eq!(seeded.source.as_deref(), Some(SEED_SOURCE));
        assert_eq!(seeded.created_by.as_deref(), Some("admin-1"));
    }

    #[tokio::test]
    async fn test_update_sets_updated_at() {
        let store = Arc::new(MemoryStore::new());
        let library = WorkoutLibrary::new(store);
        let form = WorkoutForm {
            name: "Grace".to_string(),
            category: WorkoutCategory::Benchmark,
            exercises: vec![Exercise {
                name: "Clean and Jerk".to_string(),
                ..Default::default()
            }],
            ..Default::default()
        };
        let created = library.create(form.clone(), "coach").await.unwrap();
        assert!(created.updated_at.is_none());

        let updated = library
            .update(
                &created.id,
                WorkoutForm {
                    description: "30 reps".to_string(),
                    ..form
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.description, "30 reps");
        assert!(updated.updated_at.is_some());
        assert_eq!(updated.created_by.as_deref(), Some("coach"));
    }
}
