// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Calendar event model with its two leaderboards.

use crate::models::lenient;
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// A scheduled training day stored in the `events` collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    #[serde(default)]
    pub id: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub title: String,
    /// Day of the event (`YYYY-MM-DD`). Older documents carry a time suffix.
    #[serde(default, deserialize_with = "lenient::string")]
    pub start: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub end: String,
    #[serde(
        default,
        deserialize_with = "lenient::opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<String>,
    /// Library workout shown on the main card.
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub workout_id: Option<String>,
    #[serde(default)]
    pub locker_wod: Option<LockerWod>,
    /// Stretches shown after the workout.
    #[serde(
        default,
        deserialize_with = "lenient::null_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub cool_down_exercises: Vec<CoolDownExercise>,
    #[serde(default, deserialize_with = "lenient::null_default")]
    #[cfg_attr(feature = "binding-generation", ts(type = "Array<Entry>"))]
    pub main_leaderboard: Leaderboard,
    #[serde(default, deserialize_with = "lenient::null_default")]
    #[cfg_attr(feature = "binding-generation", ts(type = "Array<Entry>"))]
    pub locker_wod_leaderboard: Leaderboard,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    /// Write counter checked by version-checked leaderboard commits.
    #[serde(default)]
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub version: u64,
}

impl Event {
    /// Calendar day of the event, without any time suffix.
    pub fn day(&self) -> &str {
        self.start.split('T').next().unwrap_or_default()
    }

    pub fn board(&self, kind: BoardKind) -> &Leaderboard {
        match kind {
            BoardKind::Main => &self.main_leaderboard,
            BoardKind::Locker => &self.locker_wod_leaderboard,
        }
    }

    pub fn board_mut(&mut self, kind: BoardKind) -> &mut Leaderboard {
        match kind {
            BoardKind::Main => &mut self.main_leaderboard,
            BoardKind::Locker => &mut self.locker_wod_leaderboard,
        }
    }

    /// The locker WOD, if it has a name or at least one exercise.
    pub fn populated_locker_wod(&self) -> Option<&LockerWod> {
        self.locker_wod.as_ref().filter(|wod| wod.is_populated())
    }
}

/// Selects one of an event's two leaderboards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "lowercase")]
pub enum BoardKind {
    Main,
    Locker,
}

impl BoardKind {
    pub const ALL: [BoardKind; 2] = [BoardKind::Main, BoardKind::Locker];

    /// Name of the event field holding this board.
    pub fn field(self) -> &'static str {
        match self {
            BoardKind::Main => "mainLeaderboard",
            BoardKind::Locker => "lockerWodLeaderboard",
        }
    }
}

impl std::fmt::Display for BoardKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            BoardKind::Main => "main",
            BoardKind::Locker => "locker",
        })
    }
}

/// Event-local bonus workout. Never added to the workout library.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct LockerWod {
    #[serde(default, deserialize_with = "lenient::string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub description: String,
    #[serde(default, deserialize_with = "lenient::null_default")]
    pub exercises: Vec<Exercise>,
}

impl LockerWod {
    pub fn is_populated(&self) -> bool {
        !self.name.is_empty() || !self.exercises.is_empty()
    }
}

/// One line of a workout. Every field is free text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Exercise {
    #[serde(default, deserialize_with = "lenient::string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub sets: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub reps: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub weight: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub duration: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub notes: String,
}

/// A stretch or recovery drill attached to an event.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct CoolDownExercise {
    #[serde(default, deserialize_with = "lenient::string")]
    pub name: String,
    /// `static_stretch`, `mobility`, `breathing`, ...
    #[serde(default, deserialize_with = "lenient::string")]
    pub category: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub duration: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub description: String,
    #[serde(default, deserialize_with = "lenient::null_default")]
    pub target_muscles: Vec<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub difficulty: String,
    /// Coach's override of `duration` for this event.
    #[serde(
        default,
        deserialize_with = "lenient::opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub custom_note: Option<String>,
}

/// One athlete's result on a leaderboard.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    /// Older entries carry numeric millisecond ids.
    #[serde(default, deserialize_with = "lenient::string")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub user_id: String,
    /// Display name when the entry was recorded. Not kept in sync.
    #[serde(default, deserialize_with = "lenient::string")]
    pub user_name: String,
    /// Elapsed seconds as a decimal string.
    #[serde(default, deserialize_with = "lenient::string")]
    pub time: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub weight: String,
}

/// Entries ordered by ascending elapsed time. See `services::leaderboard`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Leaderboard {
    pub entries: Vec<Entry>,
}
