// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! FitStreak: daily exercise streaks, milestone badges and daily challenges
//!
//! This crate provides the backend API that tracks consecutive days of
//! exercise, awards streak badges, and hands every user one randomized
//! challenge per day.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::{ExerciseCatalog, Store};
use rand::{rngs::StdRng, SeedableRng};
use services::{
    ChallengeScheduler, DailyChallengeService, ProgressService, StreakService, UserStatsService,
};
use std::sync::Arc;
use time_utils::Clock;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub catalog: Arc<dyn ExerciseCatalog>,
    pub challenges: Arc<DailyChallengeService>,
    pub streaks: StreakService,
    pub progress: ProgressService,
    pub users: UserStatsService,
    pub scheduler: ChallengeScheduler,
}

impl AppState {
    /// Wire every service to one store.
    pub fn new<S: Store + 'static>(config: Config, store: Arc<S>, clock: Arc<dyn Clock>) -> Self {
        Self::with_rng(config, store, clock, StdRng::from_entropy())
    }

    /// Like [`AppState::new`], with a specific random source for challenges.
    pub fn with_rng<S: Store + 'static>(
        config: Config,
        store: Arc<S>,
        clock: Arc<dyn Clock>,
        rng: StdRng,
    ) -> Self {
        let challenges = Arc::new(DailyChallengeService::with_rng(
            store.clone(),
            store.clone(),
            clock.clone(),
            rng,
        ));
        let streaks = StreakService::new(store.clone(), store.clone(), clock.clone());
        let progress = ProgressService::new(store.clone(), store.clone(), clock.clone());
        let users = UserStatsService::new(
            store.clone(),
            store.clone(),
            store.clone(),
            clock.clone(),
        );
        let catalog: Arc<dyn ExerciseCatalog> = store.clone();
        let scheduler = ChallengeScheduler::new(
            challenges.clone(),
            store,
            config.scheduler_batch_size,
            clock,
        );

        Self {
            config,
            catalog,
            challenges,
            streaks,
            progress,
            users,
            scheduler,
        }
    }
}
