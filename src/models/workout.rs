// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Workout library model.

use crate::models::{lenient, Exercise};
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Reusable workout template stored in the `workouts` collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct Workout {
    #[serde(default)]
    pub id: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub description: String,
    #[serde(default, deserialize_with = "lenient::null_default")]
    pub category: WorkoutCategory,
    #[serde(default, deserialize_with = "lenient::null_default")]
    pub exercises: Vec<Exercise>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    /// Set to `crossfit_seed` for workouts added by the seeder.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "lowercase")]
pub enum WorkoutCategory {
    Benchmark,
    Hero,
    Strength,
    Emom,
    Metcon,
    Bodyweight,
    Partner,
    Chipper,
    /// Anything unrecognised, including a missing category.
    #[default]
    #[serde(other)]
    General,
}

impl WorkoutCategory {
    pub const ALL: [WorkoutCategory; 9] = [
        WorkoutCategory::Benchmark,
        WorkoutCategory::Hero,
        WorkoutCategory::Strength,
        WorkoutCategory::Emom,
        WorkoutCategory::Metcon,
        WorkoutCategory::Bodyweight,
        WorkoutCategory::Partner,
        WorkoutCategory::Chipper,
        WorkoutCategory::General,
    ];

    pub fn label(self) -> &'static str {
        match self {
            WorkoutCategory::Benchmark => "Benchmark",
            WorkoutCategory::Hero => "Hero WOD",
            WorkoutCategory::Strength => "Strength",
            WorkoutCategory::Emom => "EMOM",
            WorkoutCategory::Metcon => "MetCon",
            WorkoutCategory::Bodyweight => "Bodyweight",
            WorkoutCategory::Partner => "Partner",
            WorkoutCategory::Chipper => "Chipper",
            WorkoutCategory::General => "General",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unknown_category_reads_as_general() {
        let workout: Workout =
            serde_json::from_value(json!({"name": "Mystery", "category": "cardio"})).unwrap();
        assert_eq!(workout.category, WorkoutCategory::General);
        assert_eq!(workout.category.label(), "General");

        let workout: Workout = serde_json::from_value(json!({"name": "Bare"})).unwrap();
        assert_eq!(workout.category, WorkoutCategory::General);
    }

    #[test]
    fn test_category_labels() {
        let hero: WorkoutCategory = serde_json::from_value(json!("hero")).unwrap();
        assert_eq!(hero.label(), "Hero WOD");
        assert_eq!(WorkoutCategory::Emom.label(), "EMOM");
        assert_eq!(serde_json::to_value(WorkoutCategory::Metcon).unwrap(), json!("metcon"));
    }
}
