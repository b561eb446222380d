// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Built-in catalogue of benchmark and hero workouts.

use crate::error::{AppError, Result};
use crate::models::Workout;
use std::collections::BTreeSet;

/// `source` value stamped on seeded workouts.
pub const SEED_SOURCE: &str = "crossfit_seed";

const CATALOGUE_JSON: &str = include_str!("../../data/benchmark_workouts.json");

/// The catalogue, in file order.
pub fn catalogue() -> Result<Vec<Workout>> {
    serde_json::from_str(CATALOGUE_JSON)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Invalid workout catalogue: {}", e)))
}

/// Unique exercise names across the catalogue, sorted.
pub fn catalogue_exercise_names() -> Result<Vec<String>> {
    let names: BTreeSet<String> = catalogue()?
        .into_iter()
        .flat_map(|w| w.exercises)
        .map(|e| e.name)
        .filter(|n| !n.is_empty())
        .collect();
    Ok(names.into_iter().collect())
}
