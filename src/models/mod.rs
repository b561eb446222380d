// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.
//!
//! Field names follow the stored documents (camelCase). Documents written by
//! older clients are read leniently: numbers where strings are expected,
//! `null` where a list is expected.

pub mod announcement;
pub mod event;
pub mod log;
pub mod post;
pub mod user;
pub mod workout;

pub use announcement::Announcement;
pub use event::{BoardKind, CoolDownExercise, Entry, Event, Exercise, Leaderboard, LockerWod};
pub use log::{LoggedExercise, WorkoutLog};
pub use post::{Post, PostCategory, Reply};
pub use user::{LoginRecord, OneRepMax, PersonalRecord, Role, UserProfile};
pub use workout::{Workout, WorkoutCategory};

/// Lenient serde adapters shared by the models.
pub(crate) mod lenient {
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    /// Accept a string, a number or a bool and keep it as a string.
    /// `null` and missing values become the empty string.
    pub fn string<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Option::<Value>::deserialize(deserializer)? {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s,
            Some(Value::Number(n)) => n.to_string(),
            Some(Value::Bool(b)) => b.to_string(),
            Some(other) => other.to_string(),
        })
    }

    /// Like [`string`], but empty values become `None`.
    pub fn opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = string(deserializer)?;
        Ok(if s.is_empty() { None } else { Some(s) })
    }

    /// Whole number from a number or a numeric string, read the way form
    /// inputs are: leading digits count, anything after them is ignored.
    /// `null`, empty and non-numeric strings become `None`.
    pub fn opt_int<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::Error;

        Ok(match Option::<Value>::deserialize(deserializer)? {
            None | Some(Value::Null) => None,
            Some(Value::Number(n)) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
            Some(Value::String(s)) => leading_int(&s),
            Some(other) => return Err(D::Error::custom(format!("expected a number, got {}", other))),
        })
    }

    fn leading_int(s: &str) -> Option<i64> {
        let s = s.trim_start();
        let (sign, rest) = match s.strip_prefix('-') {
            Some(rest) => (-1, rest),
            None => (1, s.strip_prefix('+').unwrap_or(s)),
        };
        let digits: String = rest.chars().take_while(char::is_ascii_digit).collect();
        digits.parse::<i64>().ok().map(|n| sign * n)
    }

    /// Treat `null` as the type's default.
    pub fn null_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
    where
        D: Deserializer<'de>,
        T: Deserialize<'de> + Default,
    {
        Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
    }
}
