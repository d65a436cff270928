// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod activity;
pub mod badge;
pub mod challenge;
pub mod exercise;
pub mod stats;
pub mod user;

pub use activity::{ActivityData, ActivityRecord, ActivityType, ProgressEntry};
pub use badge::{Milestone, StreakBadge, STREAK_MILESTONES};
pub use challenge::{ChallengeType, ChallengeWithExercise, DailyChallenge};
pub use exercise::Exercise;
pub use stats::{ChallengeStats, ProgressSummary, UserStats};
pub use user::User;

/// Encode one free-text part of a document ID.
///
/// `_` separates parts, so it is escaped along with everything
/// `urlencoding` already escapes.
pub(crate) fn id_part(value: &str) -> String {
    urlencoding::encode(value).replace('_', "%5F")
}
