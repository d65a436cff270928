// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Storage seams consumed by the services.
//!
//! Each trait is one collaborator. Services receive them as
//! `Arc<dyn Trait>`, so the Firestore client and the in-memory store are
//! interchangeable.
//!
//! Uniqueness is enforced by the store: `insert_*` methods never overwrite
//! and report a lost race as `Ok(false)`.

use crate::error::Result;
use crate::models::{ActivityRecord, DailyChallenge, Exercise, StreakBadge, User};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

/// Read access to registered users.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// List at most `limit` users.
    async fn list_users(&self, limit: u32) -> Result<Vec<User>>;

    async fn get_user(&self, user_id: &str) -> Result<Option<User>>;
}

/// Dated exercise completions.
#[async_trait]
pub trait ActivityLog: Send + Sync {
    /// All records for a user, most recent day first.
    async fn activities_for_user(&self, user_id: &str) -> Result<Vec<ActivityRecord>>;

    /// Insert a record. Returns `false` if one already exists for the same
    /// (user, exercise, day).
    async fn insert_activity(&self, record: &ActivityRecord) -> Result<bool>;
}

/// Read access to the exercise catalog.
#[async_trait]
pub trait ExerciseCatalog: Send + Sync {
    /// The whole catalog in catalog order.
    async fn list_exercises(&self) -> Result<Vec<Exercise>>;

    async fn count_exercises(&self) -> Result<u64>;

    /// The exercise at position `offset` in catalog order.
    async fn exercise_at(&self, offset: u64) -> Result<Option<Exercise>>;

    async fn get_exercise(&self, exercise_id: &str) -> Result<Option<Exercise>>;
}

/// Persistence for streak badges. Unique per (user, milestone).
#[async_trait]
pub trait BadgeStore: Send + Sync {
    async fn find_badge(&self, user_id: &str, milestone: u32) -> Result<Option<StreakBadge>>;

    /// Insert a badge. Returns `false` if the user already holds it.
    async fn insert_badge(&self, badge: &StreakBadge) -> Result<bool>;

    /// All badges for a user, ascending by milestone.
    async fn badges_for_user(&self, user_id: &str) -> Result<Vec<StreakBadge>>;
}

/// Persistence for daily challenges. Unique per (user, date).
#[async_trait]
pub trait ChallengeStore: Send + Sync {
    async fn find_challenge(&self, user_id: &str, date: NaiveDate)
        -> Result<Option<DailyChallenge>>;

    async fn get_challenge(&self, challenge_id: &str) -> Result<Option<DailyChallenge>>;

    /// Insert a challenge. Returns `false` if one already exists for the
    /// same (user, date).
    async fn insert_challenge(&self, challenge: &DailyChallenge) -> Result<bool>;

    /// Atomically add `increment` to the challenge's progress (capped at
    /// target, completing it on reaching target).
    ///
    /// Returns the updated challenge, or `None` if there is no challenge for
    /// (user, date).
    async fn apply_progress(
        &self,
        user_id: &str,
        date: NaiveDate,
        increment: u32,
        now: DateTime<Utc>,
    ) -> Result<Option<DailyChallenge>>;

    /// Atomically complete a challenge unless it is already completed.
    ///
    /// A completed challenge is returned as stored, so a completion from
    /// `apply_progress` keeps its `completed_at`. `None` if there is no
    /// such challenge.
    async fn complete_challenge(
        &self,
        challenge_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<DailyChallenge>>;

    /// Challenges for a user, most recent first, optionally limited.
    async fn challenges_for_user(
        &self,
        user_id: &str,
        limit: Option<u32>,
    ) -> Result<Vec<DailyChallenge>>;
}

/// Every collaborator at once; implemented by each backend.
pub trait Store:
    UserDirectory + ActivityLog + ExerciseCatalog + BadgeStore + ChallengeStore
{
}

impl<T> Store for T where
    T: UserDirectory + ActivityLog + ExerciseCatalog + BadgeStore + ChallengeStore
{
}
