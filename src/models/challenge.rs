// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Daily challenge model.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::models::Exercise;

/// Reward text shown when a challenge is finished.
pub const DEFAULT_REWARD: &str = "🎉 Great job!";

/// Archetype of a daily challenge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum ChallengeType {
    CompleteExercises,
    ExerciseStreak,
    SpecificExercise,
    TimeChallenge,
    VarietyChallenge,
}

impl ChallengeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CompleteExercises => "complete_exercises",
            Self::ExerciseStreak => "exercise_streak",
            Self::SpecificExercise => "specific_exercise",
            Self::TimeChallenge => "time_challenge",
            Self::VarietyChallenge => "variety_challenge",
        }
    }
}

/// One user's challenge for one calendar day.
///
/// At most one exists per (user, date). `challenge_type`, `target` and
/// `exercise_id` never change after creation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct DailyChallenge {
    /// Document ID (`{user_id}_{date}`)
    pub id: String,
    pub user_id: String,
    /// Calendar day the challenge belongs to (YYYY-MM-DD)
    pub date: NaiveDate,
    pub challenge_type: ChallengeType,
    pub title: String,
    pub description: String,
    /// Target count, at least 1
    pub target: u32,
    /// Progress towards `target`, never above it
    #[serde(default)]
    pub progress: u32,
    #[serde(default)]
    pub is_completed: bool,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    /// Bound exercise (specific_exercise only)
    #[serde(default)]
    pub exercise_id: Option<String>,
    #[serde(default = "default_reward")]
    pub reward: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn default_reward() -> String {
    DEFAULT_REWARD.to_string()
}

impl DailyChallenge {
    /// Document ID: one challenge per user and day.
    pub fn document_id(user_id: &str, date: NaiveDate) -> String {
        format!("{}_{}", super::id_part(user_id), date)
    }

    /// Add `increment` to progress, capped at `target`.
    ///
    /// Returns `true` only on the transition to completed; `completed_at` is
    /// stamped on that transition and never again.
    pub fn apply_progress(&mut self, increment: u32, now: DateTime<Utc>) -> bool {
        self.progress = self.progress.saturating_add(increment).min(self.target);
        self.updated_at = now;

        if self.progress >= self.target && !self.is_completed {
            self.is_completed = true;
            self.completed_at = Some(now);
            return true;
        }
        false
    }

    /// Force completion. No-op (returns `false`) if already completed.
    pub fn mark_complete(&mut self, now: DateTime<Utc>) -> bool {
        if self.is_completed {
            return false;
        }
        self.progress = self.target;
        self.is_completed = true;
        self.completed_at = Some(now);
        self.updated_at = now;
        true
    }
}

/// A challenge with its bound exercise resolved, for API responses.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ChallengeWithExercise {
    #[serde(flatten)]
    pub challenge: DailyChallenge,
    pub exercise: Option<Exercise>,
}
