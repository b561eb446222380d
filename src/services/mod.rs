// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod announcements;
pub mod cooldowns;
pub mod deadline;
pub mod events;
pub mod leaderboard;
pub mod logs;
pub mod messageboard;
pub mod profiles;
pub mod seed;
pub mod workouts;

pub use announcements::{AnnouncementForm, AnnouncementService};
pub use cooldowns::{CoolDownCatalogue, CoolDownRoutine};
pub use events::{EventDetails, EventForm, EventService, TrainingDay, WorkoutCard};
pub use leaderboard::{
    CommitPolicy, EntryInput, LeaderboardService, LeaderboardSession, LeaderboardWrite,
    RankedEntry, SessionState,
};
pub use logs::{LogForm, WorkoutLogService};
pub use messageboard::{CategorySummary, LikeState, MessageBoard, PostForm, ReplyForm};
pub use profiles::{AdminOverview, MemberDetail, ProfileService, ProfileUpdate};
pub use workouts::{SeedReport, WorkoutFilter, WorkoutForm, WorkoutLibrary};
