// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod challenge;
pub mod progress;
pub mod scheduler;
pub mod streak;
pub mod user_stats;

pub use challenge::DailyChallengeService;
pub use progress::{CompletionDetails, ProgressService};
pub use scheduler::{BatchReport, ChallengeScheduler, SchedulerState};
pub use streak::{StreakCheck, StreakService, StreakSummary};
pub use user_stats::UserStatsService;
