// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Built-in catalogue of cool-down stretches and routines.

use crate::error::{AppError, Result};
use crate::models::CoolDownExercise;
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

const CATALOGUE_JSON: &str = include_str!("../../data/cool_down_exercises.json");

/// A named sequence of catalogue exercises.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct CoolDownRoutine {
    pub key: String,
    pub name: String,
    pub duration: String,
    pub description: String,
    /// Exercise names, in order.
    pub exercises: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct CoolDownCatalogue {
    pub exercises: Vec<CoolDownExercise>,
    pub routines: Vec<CoolDownRoutine>,
}

impl CoolDownCatalogue {
    pub fn load() -> Result<Self> {
        serde_json::from_str(CATALOGUE_JSON)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Invalid cool-down catalogue: {}", e)))
    }

    pub fn by_name(&self, name: &str) -> Option<&CoolDownExercise> {
        self.exercises.iter().find(|e| e.name == name)
    }

    /// Exercises in `category`; `None` or `"all"` returns everything.
    pub fn by_category(&self, category: Option<&str>) -> Vec<CoolDownExercise> {
        match category.filter(|c| !c.is_empty() && *c != "all") {
            Some(c) => self
                .exercises
                .iter()
                .filter(|e| e.category == c)
                .cloned()
                .collect(),
            None => self.exercises.clone(),
        }
    }

    /// A routine's exercises, resolved against the catalogue.
    pub fn routine(&self, key: &str) -> Result<Vec<CoolDownExercise>> {
        let routine = self
            .routines
            .iter()
            .find(|r| r.key == key)
            .ok_or_else(|| AppError::NotFound(format!("Cool-down routine {}", key)))?;
        Ok(routine
            .exercises
            .iter()
            .filter_map(|name| self.by_name(name))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalogue_parses() {
        let catalogue = CoolDownCatalogue::load().unwrap();
        assert_eq!(catalogue.exercises.len(), 34);
        assert_eq!(catalogue.routines.len(), 4);

        for routine in &catalogue.routines {
            for name in &routine.exercises {
                assert!(catalogue.by_name(name).is_some(), "{} missing", name);
            }
        }

        let twist = catalogue.by_name("Seated Spinal Twist").unwrap();
        assert_eq!(twist.category, "static_stretch");
        assert!(twist.target_muscles.contains(&"Obliques".to_string()));
        assert_eq!(twist.custom_note, None);
    }

    #[test]
    fn test_filters_and_routines() {
        let catalogue = CoolDownCatalogue::load().unwrap();
        let breathing = catalogue.by_category(Some("breathing"));
        assert!(!breathing.is_empty());
        assert!(breathing.iter().all(|e| e.category == "breathing"));
        assert_eq!(catalogue.by_category(Some("all")).len(), 34);
        assert_eq!(catalogue.by_category(None).len(), 34);

        let standard = catalogue.routines.iter().find(|r| r.key == "standard").unwrap();
        let resolved = catalogue.routine("standard").unwrap();
        assert_eq!(resolved.len(), standard.exercises.len());
        assert_eq!(resolved[0].name, standard.exercises[0]);

        assert!(matches!(
            catalogue.routine("nope"),
            Err(AppError::NotFound(_))
        ));
    }
}
