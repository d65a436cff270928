// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-memory store for local development and tests.
//!
//! Documents are keyed by the same deterministic IDs the Firestore backend
//! uses, so the uniqueness rules are identical: a vacant-entry insert
//! either creates the document or reports that it already exists.

use crate::db::store::{ActivityLog, BadgeStore, ChallengeStore, ExerciseCatalog, UserDirectory};
use crate::error::{AppError, Result};
use crate::models::{ActivityRecord, DailyChallenge, Exercise, StreakBadge, User};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

/// DashMap-backed store.
#[derive(Default)]
pub struct MemoryDb {
    users: DashMap<String, User>,
    exercises: DashMap<String, Exercise>,
    activities: DashMap<String, ActivityRecord>,
    badges: DashMap<String, StreakBadge>,
    challenges: DashMap<String, DailyChallenge>,
}

impl MemoryDb {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create or replace a user.
    pub fn upsert_user(&self, user: User) {
        self.users.insert(user.id.clone(), user);
    }

    /// Create or replace a catalog exercise.
    pub fn upsert_exercise(&self, exercise: Exercise) {
        self.exercises.insert(exercise.id.clone(), exercise);
    }
}

/// Insert `value` under `key` unless the key is taken.
fn insert_if_absent<T>(map: &DashMap<String, T>, key: String, value: T) -> bool {
    match map.entry(key) {
        Entry::Occupied(_) => false,
        Entry::Vacant(slot) => {
            slot.insert(value);
            true
        }
    }
}

#[async_trait]
impl UserDirectory for MemoryDb {
    async fn list_users(&self, limit: u32) -> Result<Vec<User>> {
        let mut users: Vec<User> = self.users.iter().map(|u| u.value().clone()).collect();
        users.sort_by(|a, b| a.id.cmp(&b.id));
        users.truncate(limit as usize);
        Ok(users)
    }

    async fn get_user(&self, user_id: &str) -> Result<Option<User>> {
        Ok(self.users.get(user_id).map(|u| u.value().clone()))
    }
}

#[async_trait]
impl ActivityLog for MemoryDb {
    async fn activities_for_user(&self, user_id: &str) -> Result<Vec<ActivityRecord>> {
        let mut records: Vec<ActivityRecord> = self
            .activities
            .iter()
            .filter(|r| r.user_id == user_id)
            .map(|r| r.value().clone())
            .collect();
        records.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(records)
    }

    async fn insert_activity(&self, record: &ActivityRecord) -> Result<bool> {
        Ok(insert_if_absent(
            &self.activities,
            record.document_id(),
            record.clone(),
        ))
    }
}

#[async_trait]
impl ExerciseCatalog for MemoryDb {
    async fn list_exercises(&self) -> Result<Vec<Exercise>> {
        let mut exercises: Vec<Exercise> =
            self.exercises.iter().map(|e| e.value().clone()).collect();
        exercises.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(exercises)
    }

    async fn count_exercises(&self) -> Result<u64> {
        Ok(self.exercises.len() as u64)
    }

    async fn exercise_at(&self, offset: u64) -> Result<Option<Exercise>> {
        let exercises = self.list_exercises().await?;
        let index = usize::try_from(offset)
            .map_err(|_| AppError::BadRequest(format!("Offset {} out of range", offset)))?;
        Ok(exercises.into_iter().nth(index))
    }

    async fn get_exercise(&self, exercise_id: &str) -> Result<Option<Exercise>> {
        Ok(self.exercises.get(exercise_id).map(|e| e.value().clone()))
    }
}

#[async_trait]
impl BadgeStore for MemoryDb {
    async fn find_badge(&self, user_id: &str, milestone: u32) -> Result<Option<StreakBadge>> {
        let id = StreakBadge::document_id(user_id, milestone);
        Ok(self.badges.get(&id).map(|b| b.value().clone()))
    }

    async fn insert_badge(&self, badge: &StreakBadge) -> Result<bool> {
        Ok(insert_if_absent(&self.badges, badge.id.clone(), badge.clone()))
    }

    async fn badges_for_user(&self, user_id: &str) -> Result<Vec<StreakBadge>> {
        let mut badges: Vec<StreakBadge> = self
            .badges
            .iter()
            .filter(|b| b.user_id == user_id)
            .map(|b| b.value().clone())
            .collect();
        badges.sort_by_key(|b| b.milestone);
        Ok(badges)
    }
}

#[async_trait]
impl ChallengeStore for MemoryDb {
    async fn find_challenge(
        &self,
        user_id: &str,
        date: NaiveDate,
    ) -> Result<Option<DailyChallenge>> {
        let id = DailyChallenge::document_id(user_id, date);
        Ok(self.challenges.get(&id).map(|c| c.value().clone()))
    }

    async fn get_challenge(&self, challenge_id: &str) -> Result<Option<DailyChallenge>> {
        Ok(self.challenges.get(challenge_id).map(|c| c.value().clone()))
    }

    async fn insert_challenge(&self, challenge: &DailyChallenge) -> Result<bool> {
        Ok(insert_if_absent(
            &self.challenges,
            challenge.id.clone(),
            challenge.clone(),
        ))
    }

    async fn apply_progress(
        &self,
        user_id: &str,
        date: NaiveDate,
        increment: u32,
        now: DateTime<Utc>,
    ) -> Result<Option<DailyChallenge>> {
        let id = DailyChallenge::document_id(user_id, date);
        // The entry guard holds the shard lock for the read-modify-write.
        Ok(self.challenges.get_mut(&id).map(|mut challenge| {
            if !challenge.is_completed {
                challenge.apply_progress(increment, now);
            }
            challenge.clone()
        }))
    }

    async fn complete_challenge(
        &self,
        challenge_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<DailyChallenge>> {
        Ok(self.challenges.get_mut(challenge_id).map(|mut challenge| {
            challenge.mark_complete(now);
            challenge.clone()
        }))
    }

    async fn challenges_for_user(
        &self,
        user_id: &str,
        limit: Option<u32>,
    ) -> Result<Vec<DailyChallenge>> {
        let mut challenges: Vec<DailyChallenge> = self
            .challenges
            .iter()
            .filter(|c| c.user_id == user_id)
            .map(|c| c.value().clone())
            .collect();
        challenges.sort_by(|a, b| b.date.cmp(&a.date));
        if let Some(limit) = limit {
            challenges.truncate(limit as usize);
        }
        Ok(challenges)
    }
}
