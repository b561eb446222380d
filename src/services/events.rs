// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Calendar events and training-day composition.

use crate::db::{collections, get_as, list_as, to_fields, DocumentStore, Query};
use crate::error::{AppError, Result};
use crate::models::{BoardKind, CoolDownExercise, Event, LockerWod, Workout};
use crate::services::leaderboard::RankedEntry;
use crate::time_utils::{now_rfc3339, parse_day};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::{Validate, ValidationError};

/// Name given to a locker WOD saved without one.
pub const DEFAULT_LOCKER_WOD_NAME: &str = "Locker WOD";

/// Fields an admin edits on an event.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct EventForm {
    #[serde(default)]
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    #[serde(default)]
    #[validate(custom(function = "validate_start"))]
    pub start: String,
    /// Defaults to `start`; training sessions are same-day events.
    #[serde(default)]
    pub end: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub workout_id: Option<String>,
    #[serde(default)]
    pub locker_wod: Option<LockerWod>,
    #[serde(default)]
    pub cool_down_exercises: Vec<CoolDownExercise>,
}

fn validate_start(start: &str) -> std::result::Result<(), ValidationError> {
    let day = start.split('T').next().unwrap_or_default();
    match parse_day(day) {
        Some(_) => Ok(()),
        None => {
            let mut err = ValidationError::new("date");
            err.message = Some("Date must be YYYY-MM-DD".into());
            Err(err)
        }
    }
}

/// Stored form of the editable fields. `None` is written as `null`.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EventFormFields {
    title: String,
    start: String,
    end: String,
    description: Option<String>,
    workout_id: Option<String>,
    locker_wod: Option<LockerWod>,
    cool_down_exercises: Vec<CoolDownExercise>,
}

impl EventForm {
    fn into_fields(self) -> EventFormFields {
        let end = self
            .end
            .filter(|e| !e.trim().is_empty())
            .unwrap_or_else(|| self.start.clone());
        EventFormFields {
            title: self.title.trim().to_string(),
            start: self.start,
            end,
            description: self.description.filter(|d| !d.trim().is_empty()),
            workout_id: self.workout_id.filter(|w| !w.trim().is_empty()),
            locker_wod: normalize_locker_wod(self.locker_wod),
            cool_down_exercises: self
                .cool_down_exercises
                .into_iter()
                .filter(|c| !c.name.trim().is_empty())
                .collect(),
        }
    }
}

/// Keep a locker WOD only when it has a name or exercises; name it if unnamed.
pub fn normalize_locker_wod(wod: Option<LockerWod>) -> Option<LockerWod> {
    let mut wod = wod.filter(LockerWod::is_populated)?;
    if wod.name.is_empty() {
        wod.name = DEFAULT_LOCKER_WOD_NAME.to_string();
    }
    Some(wod)
}

// ─── Cards ───────────────────────────────────────────────────

/// Workout shown on a card: a library workout or the event's locker WOD.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[serde(untagged)]
pub enum CardWorkout {
    Library(Workout),
    Locker(LockerWod),
}

/// One displayable workout of a training day.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutCard {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: BoardKind,
    pub event_id: String,
    pub title: String,
    pub workout: CardWorkout,
    /// Whether either of the event's boards has entries.
    pub has_leaderboard: bool,
    pub leaderboard: Vec<RankedEntry>,
    #[cfg_attr(feature = "binding-generation", ts(type = "string"))]
    pub leaderboard_type: &'static str,
}

/// Derive the cards for one event.
///
/// A main card needs `workout_id` to resolve in `workouts`; a dangling id
/// yields no main card. A locker card needs a populated locker WOD.
pub fn cards_for_event(event: &Event, workouts: &HashMap<String, Workout>) -> Vec<WorkoutCard> {
    let has_leaderboard =
        !event.main_leaderboard.is_empty() || !event.locker_wod_leaderboard.is_empty();
    let mut cards = Vec::with_capacity(2);

    let main_workout = event
        .workout_id
        .as_deref()
        .and_then(|id| workouts.get(id));
    if let Some(workout) = main_workout {
        cards.push(WorkoutCard {
            id: format!("{}-main", event.id),
            kind: BoardKind::Main,
            event_id: event.id.clone(),
            title: event.title.clone(),
            workout: CardWorkout::Library(workout.clone()),
            has_leaderboard,
            leaderboard: event.main_leaderboard.ranked(),
            leaderboard_type: BoardKind::Main.field(),
        });
    }

    if let Some(wod) = event.populated_locker_wod() {
        cards.push(WorkoutCard {
            id: format!("{}-locker", event.id),
            kind: BoardKind::Locker,
            event_id: event.id.clone(),
            title: DEFAULT_LOCKER_WOD_NAME.to_string(),
            workout: CardWorkout::Locker(wod.clone()),
            has_leaderboard,
            leaderboard: event.locker_wod_leaderboard.ranked(),
            leaderboard_type: BoardKind::Locker.field(),
        });
    }

    cards
}

/// Everything scheduled on one day.
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct TrainingDay {
    pub date: String,
    pub events: Vec<Event>,
    pub cards: Vec<WorkoutCard>,
}

/// An event with its library workout, if the reference still resolves.
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct EventDetails {
    pub event: Event,
    pub workout: Option<Workout>,
}

// ─── Service ─────────────────────────────────────────────────

#[derive(Clone)]
pub struct EventService {
    store: Arc<dyn DocumentStore>,
}

impl EventService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub async fn list(&self) -> Result<Vec<Event>> {
        Ok(list_as(self.store.as_ref(), collections::EVENTS, Query::all()).await?)
    }

    pub async fn get(&self, event_id: &str) -> Result<Event> {
        get_as::<Event>(self.store.as_ref(), collections::EVENTS, event_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Event {}", event_id)))
    }

    pub async fn details(&self, event_id: &str) -> Result<EventDetails> {
        let event = self.get(event_id).await?;
        let workout = match event.workout_id.as_deref() {
            Some(id) => self.workout_details(id).await?,
            None => None,
        };
        Ok(EventDetails { event, workout })
    }

    /// The library workout with `workout_id`. A missing workout is not an error.
    pub async fn workout_details(&self, workout_id: &str) -> Result<Option<Workout>> {
        Ok(get_as::<Workout>(self.store.as_ref(), collections::WORKOUTS, workout_id).await?)
    }

    pub async fn create(&self, form: EventForm, created_by: &str) -> Result<Event> {
        form.validate()?;
        let fields = form.into_fields();

        let mut event = Event {
            title: fields.title,
            start: fields.start,
            end: fields.end,
            description: fields.description,
            workout_id: fields.workout_id,
            locker_wod: fields.locker_wod,
            cool_down_exercises: fields.cool_down_exercises,
            created_by: Some(created_by.to_string()),
            created_at: now_rfc3339(),
            ..Default::default()
        };

        event.id = self
            .store
            .add(collections::EVENTS, to_fields(&event)?)
            .await?;

        tracing::info!(event_id = %event.id, day = event.day(), created_by, "Event created");
        Ok(event)
    }

    /// Overwrite the editable fields. Leaderboards are left untouched.
    pub async fn update(&self, event_id: &str, form: EventForm) -> Result<Event> {
        form.validate()?;
        let mut fields = to_fields(&form.into_fields())?;
        fields.insert(
            "updatedAt".to_string(),
            serde_json::Value::String(now_rfc3339()),
        );

        self.store
            .update_fields(collections::EVENTS, event_id, fields)
            .await?;

        tracing::info!(event_id, "Event updated");
        self.get(event_id).await
    }

    /// Delete an event. Does not cascade.
    pub async fn delete(&self, event_id: &str) -> Result<()> {
        self.store.delete(collections::EVENTS, event_id).await?;
        tracing::info!(event_id, "Event deleted");
        Ok(())
    }

    /// Events whose start falls on `day` (`YYYY-MM-DD`).
    pub async fn events_on(&self, day: &str) -> Result<Vec<Event>> {
        let mut events = self.list().await?;
        events.retain(|e| e.day() == day);
        Ok(events)
    }

    /// Compose the cards for every event on `day`.
    pub async fn training_day(&self, day: &str) -> Result<TrainingDay> {
        if parse_day(day).is_none() {
            return Err(AppError::Validation(format!(
                "date: '{}' is not YYYY-MM-DD",
                day
            )));
        }

        let events = self.events_on(day).await?;

        let mut workouts = HashMap::new();
        for id in events.iter().filter_map(|e| e.workout_id.as_deref()) {
            if workouts.contains_key(id) {
                continue;
            }
            if let Some(workout) = self.workout_details(id).await? {
                workouts.insert(id.to_string(), workout);
            }
        }

        let cards = events
            .iter()
            .flat_map(|e| cards_for_event(e, &workouts))
            .collect();

        Ok(TrainingDay {
            date: day.to_string(),
            events,
            cards,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use crate::models::{Entry, Exercise, Leaderboard};

    fn workout(id: &str) -> Workout {
        Workout {
            id: id.to_string(),
            name: "Fran".to_string(),
            ..Default::default()
        }
    }

    fn library() -> HashMap<String, Workout> {
        HashMap::from([("w1".to_string(), workout("w1"))])
    }

    fn locker_with_exercise() -> LockerWod {
        LockerWod {
            exercises: vec![Exercise {
                name: "Hollow Hold".to_string(),
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    #[test]
    fn test_main_card_only() {
        let event = Event {
            id: "e1".to_string(),
            title: "Friday".to_string(),
            workout_id: Some("w1".to_string()),
            locker_wod: Some(LockerWod::default()),
            ..Default::default()
        };
        let cards = cards_for_event(&event, &library());

        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].kind, BoardKind::Main);
        assert_eq!(cards[0].id, "e1-main");
        assert_eq!(cards[0].title, "Friday");
        assert_eq!(cards[0].leaderboard_type, "mainLeaderboard");
    }

    #[test]
    fn test_main_and_locker_cards() {
        let event = Event {
            id: "e1".to_string(),
            workout_id: Some("w1".to_string()),
            locker_wod: Some(locker_with_exercise()),
            locker_wod_leaderboard: Leaderboard::new(vec![Entry {
                id: "x".to_string(),
                time: "61".to_string(),
                ..Default::default()
            }]),
            ..Default::default()
        };
        let cards = cards_for_event(&event, &library());

        assert_eq!(cards.len(), 2);
        assert_eq!(cards[1].id, "e1-locker");
        assert_eq!(cards[1].title, "Locker WOD");
        assert!(cards[0].has_leaderboard);
        assert_eq!(cards[1].leaderboard[0].display, "1:01");
    }

    #[test]
    fn test_no_cards_for_dangling_or_empty_event() {
        let dangling = Event {
            id: "e1".to_string(),
            workout_id: Some("deleted".to_string()),
            ..Default::default()
        };
        assert!(cards_for_event(&dangling, &library()).is_empty());
        assert!(cards_for_event(&Event::default(), &library()).is_empty());

        let locker_only = Event {
            id: "e2".to_string(),
            workout_id: Some("deleted".to_string()),
            locker_wod: Some(LockerWod {
                name: "Core".to_string(),
                ..Default::default()
            }),
            ..Default::default()
        };
        let cards = cards_for_event(&locker_only, &library());
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].kind, BoardKind::Locker);
    }

    #[test]
    fn test_normalize_locker_wod() {
        assert_eq!(normalize_locker_wod(None), None);
        assert_eq!(normalize_locker_wod(Some(LockerWod::default())), None);

        let named = normalize_locker_wod(Some(locker_with_exercise())).unwrap();
        assert_eq!(named.name, "Locker WOD");
    }

    #[test]
    fn test_form_validation() {
        let missing_title = EventForm {
            start: "2024-05-03".to_string(),
            ..Default::default()
        };
        assert!(missing_title.validate().is_err());

        let bad_date = EventForm {
            title: "Friday".to_string(),
            start: "05/03/2024".to_string(),
            ..Default::default()
        };
        assert!(bad_date.validate().is_err());

        let ok = EventForm {
            title: "Friday".to_string(),
            start: "2024-05-03T06:00".to_string(),
            ..Default::default()
        };
        assert!(ok.validate().is_ok());
    }

    #[tokio::test]
    async fn test_create_update_keeps_boards() {
        let store = Arc::new(MemoryStore::new());
        let svc = EventService::new(store.clone());

        let created = svc
            .create(
                EventForm {
                    title: "Murph".to_string(),
                    start: "2024-05-27".to_string(),
                    workout_id: Some(String::new()),
                    locker_wod: Some(locker_with_exercise()),
                    ..Default::default()
                },
                "admin-1",
            )
            .await
            .unwrap();

        assert_eq!(created.end, "2024-05-27");
        assert_eq!(created.workout_id, None);
        assert_eq!(created.created_by.as_deref(), Some("admin-1"));
        assert_eq!(created.locker_wod.as_ref().unwrap().name, "Locker WOD");

        store
            .update_fields(
                collections::EVENTS,
                &created.id,
                to_fields(&serde_json::json!({
                    "mainLeaderboard": [{"id": "a", "userId": "u1", "time": "100"}]
                }))
                .unwrap(),
            )
            .await
            .unwrap();

        let updated = svc
            .update(
                &created.id,
                EventForm {
                    title: "Murph (scaled)".to_string(),
                    start: "2024-05-27".to_string(),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.title, "Murph (scaled)");
        assert!(updated.locker_wod.is_none());
        assert!(updated.cool_down_exercises.is_empty());
        assert_eq!(updated.main_leaderboard.len(), 1);
        assert!(updated.updated_at.is_some());
    }

    #[tokio::test]
    async fn test_update_missing_event_is_not_found() {
        let svc = EventService::new(Arc::new(MemoryStore::new()));
        let err = svc
            .update(
                "ghost",
                EventForm {
                    title: "x".to_string(),
                    start: "2024-01-01".to_string(),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_training_day_filters_by_day() {
        let store = Arc::new(MemoryStore::new());
        let svc = EventService::new(store.clone());
        store
            .set(collections::WORKOUTS, "w1", to_fields(&workout("w1")).unwrap())
            .await
            .unwrap();

        for (title, start) in [
            ("Today", "2024-05-03"),
            ("Legacy", "2024-05-03T06:00:00"),
            ("Tomorrow", "2024-05-04"),
        ] {
            svc.create(
                EventForm {
                    title: title.to_string(),
                    start: start.to_string(),
                    workout_id: Some("w1".to_string()),
                    ..Default::default()
                },
                "admin",
            )
            .await
            .unwrap();
        }

        let day = svc.training_day("2024-05-03").await.unwrap();
        assert_eq!(day.events.len(), 2);
        assert_eq!(day.cards.len(), 2);
        assert!(day.cards.iter().all(|c| c.kind == BoardKind::Main));

        assert!(matches!(
            svc.training_day("May 3").await,
            Err(AppError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_details_tolerates_deleted_workout() {
        let store = Arc::new(MemoryStore::new());
        let svc = EventService::new(store);
        let event = svc
            .create(
                EventForm {
                    title: "Orphan".to_string(),
                    start: "2024-05-03".to_string(),
                    workout_id: Some("gone".to_string()),
                    ..Default::default()
                },
                "admin",
            )
            .await
            .unwrap();

        let details = svc.details(&event.id).await.unwrap();
        assert_eq!(details.event.workout_id.as_deref(), Some("gone"));
        assert!(details.workout.is_none());
    }
}
