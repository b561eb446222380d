// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Gym Portal: member portal backend for a CrossFit-style gym
//!
//! This crate provides the backend API for the training calendar and its
//! leaderboards, the workout library, the message board, member profiles
//! and the admin dashboard.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::DocumentStore;
use services::{
    AnnouncementService, EventService, LeaderboardService, MessageBoard, ProfileService,
    WorkoutLibrary, WorkoutLogService,
};
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub store: Arc<dyn DocumentStore>,
    pub events: EventService,
    pub leaderboards: LeaderboardService,
    pub workouts: WorkoutLibrary,
    pub board: MessageBoard,
    pub profiles: ProfileService,
    pub logs: WorkoutLogService,
    pub announcements: AnnouncementService,
}

impl AppState {
    pub fn new(config: Config, store: Arc<dyn DocumentStore>) -> Self {
        Self {
            events: EventService::new(store.clone()),
            leaderboards: LeaderboardService::new(
                store.clone(),
                config.leaderboard_commit_policy,
                config.leaderboard_save_timeout,
            ),
            workouts: WorkoutLibrary::new(store.clone()),
            board: MessageBoard::new(store.clone()),
            profiles: ProfileService::new(store.clone(), config.profile_fetch_timeout),
            logs: WorkoutLogService::new(store.clone()),
            announcements: AnnouncementService::new(store.clone()),
            store,
            config,
        }
    }
}
