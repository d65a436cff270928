// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Daily challenge service.
//!
//! Handles the challenge lifecycle:
//! 1. Pick a weighted-random template and target for the day
//! 2. Bind a random catalog exercise when the template needs one
//! 3. Create the challenge once per user per day
//! 4. Advance progress from activity events, capped at the target
//! 5. Summarize completion history

use crate::db::{ChallengeStore, ExerciseCatalog};
use crate::error::{AppError, Result};
use crate::models::challenge::DEFAULT_REWARD;
use crate::models::{
    ActivityData, ActivityType, ChallengeStats, ChallengeType, ChallengeWithExercise,
    DailyChallenge,
};
use crate::time_utils::Clock;
use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::{Arc, Mutex};

/// Archetype a daily challenge is generated from.
pub struct ChallengeTemplate {
    pub challenge_type: ChallengeType,
    pub weight: u32,
    /// Inclusive target range
    pub target_range: (u32, u32),
    pub requires_exercise: bool,
    title: fn(u32, &str) -> String,
    description: fn(u32, &str) -> String,
}

impl ChallengeTemplate {
    pub fn title(&self, target: u32, exercise_name: &str) -> String {
        (self.title)(target, exercise_name)
    }

    pub fn description(&self, target: u32, exercise_name: &str) -> String {
        (self.description)(target, exercise_name)
    }
}

pub static CHALLENGE_TEMPLATES: [ChallengeTemplate; 4] = [
    ChallengeTemplate {
        challenge_type: ChallengeType::CompleteExercises,
        weight: 3,
        target_range: (2, 5),
        requires_exercise: false,
        title: |target, _| format!("Complete {} Exercises Today", target),
        description: |target, _| {
            format!(
                "Challenge yourself to complete {} exercises today. You've got this!",
                target
            )
        },
    },
    ChallengeTemplate {
        challenge_type: ChallengeType::SpecificExercise,
        weight: 2,
        target_range: (1, 1),
        requires_exercise: true,
        title: |_, name| format!("Master: {}", name),
        description: |_, name| {
            format!(
                "Focus on the {} exercise today. Complete it to finish the challenge.",
                name
            )
        },
    },
    ChallengeTemplate {
        challenge_type: ChallengeType::VarietyChallenge,
        weight: 2,
        target_range: (3, 5),
        requires_exercise: false,
        title: |target, _| format!("Try {} Different Exercises", target),
        description: |target, _| {
            format!(
                "Expand your horizons! Complete {} different exercises today.",
                target
            )
        },
    },
    ChallengeTemplate {
        challenge_type: ChallengeType::ExerciseStreak,
        weight: 1,
        target_range: (1, 1),
        requires_exercise: false,
        title: |_, _| "Build Your Streak".to_string(),
        description: |target, _| {
            format!(
                "Complete at least one exercise today to maintain your {}-day streak goal!",
                target
            )
        },
    },
];

/// Pick a template by weight, then a target uniformly from its range.
pub fn select_template<R: Rng>(rng: &mut R) -> (&'static ChallengeTemplate, u32) {
    let template = match WeightedIndex::new(CHALLENGE_TEMPLATES.iter().map(|t| t.weight)) {
        Ok(weights) => &CHALLENGE_TEMPLATES[weights.sample(rng)],
        Err(_) => &CHALLENGE_TEMPLATES[0],
    };

    let (min, max) = template.target_range;
    (template, rng.gen_range(min..=max))
}

/// How much an activity advances a challenge (0 or 1).
pub fn progress_increment(
    challenge: &DailyChallenge,
    activity_type: ActivityType,
    data: &ActivityData,
) -> u32 {
    if activity_type != ActivityType::ExerciseCompleted {
        return 0;
    }

    match challenge.challenge_type {
        ChallengeType::CompleteExercises | ChallengeType::ExerciseStreak => 1,
        ChallengeType::SpecificExercise => {
            let matches = matches!(
                (data.exercise_id.as_deref(), challenge.exercise_id.as_deref()),
                (Some(done), Some(bound)) if done == bound
            );
            u32::from(matches)
        }
        // Counts every completion, not distinct exercises.
        ChallengeType::VarietyChallenge => 1,
        ChallengeType::TimeChallenge => 0,
    }
}

/// Daily challenge generation and tracking.
pub struct DailyChallengeService {
    challenges: Arc<dyn ChallengeStore>,
    exercises: Arc<dyn ExerciseCatalog>,
    clock: Arc<dyn Clock>,
    rng: Mutex<StdRng>,
}

impl DailyChallengeService {
    pub fn new(
        challenges: Arc<dyn ChallengeStore>,
        exercises: Arc<dyn ExerciseCatalog>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self::with_rng(challenges, exercises, clock, StdRng::from_entropy())
    }

    /// Construct with a specific random source (seeded in tests).
    pub fn with_rng(
        challenges: Arc<dyn ChallengeStore>,
        exercises: Arc<dyn ExerciseCatalog>,
        clock: Arc<dyn Clock>,
        rng: StdRng,
    ) -> Self {
        Self {
            challenges,
            exercises,
            clock,
            rng: Mutex::new(rng),
        }
    }

    /// Run `f` with the RNG. The lock is never held across an await.
    fn with_rng_locked<T>(&self, f: impl FnOnce(&mut StdRng) -> T) -> Result<T> {
        let mut rng = self
            .rng
            .lock()
            .map_err(|_| AppError::Internal(anyhow::anyhow!("RNG lock poisoned")))?;
        Ok(f(&mut rng))
    }

    /// Create today's challenge for a user, or return the existing one.
    ///
    /// Returns `None` without touching the store if `user_id` is blank.
    pub async fn generate_daily_challenge(&self, user_id: &str) -> Result<Option<DailyChallenge>> {
        if user_id.trim().is_empty() {
            tracing::debug!("Daily challenge generation skipped - no user id");
            return Ok(None);
        }

        let today = self.clock.today();

        if let Some(existing) = self.challenges.find_challenge(user_id, today).await? {
            return Ok(Some(existing));
        }

        let (template, target) = self.with_rng_locked(|rng| select_template(rng))?;

        let mut exercise_id = None;
        let mut exercise_name = String::new();

        if template.requires_exercise {
            let count = self.exercises.count_exercises().await?;
            if count > 0 {
                let offset = self.with_rng_locked(|rng| rng.gen_range(0..count))?;
                if let Some(exercise) = self.exercises.exercise_at(offset).await? {
                    exercise_id = Some(exercise.id);
                    exercise_name = exercise.name;
                }
            }
        }

        let now = self.clock.now_utc();
        let challenge = DailyChallenge {
            id: DailyChallenge::document_id(user_id, today),
            user_id: user_id.to_string(),
            date: today,
            challenge_type: template.challenge_type,
            title: template.title(target, &exercise_name),
            description: template.description(target, &exercise_name),
            target,
            progress: 0,
            is_completed: false,
            completed_at: None,
            exercise_id,
            reward: DEFAULT_REWARD.to_string(),
            created_at: now,
            updated_at: now,
        };

        if self.challenges.insert_challenge(&challenge).await? {
            tracing::info!(
                user_id,
                date = %today,
                challenge_type = challenge.challenge_type.as_str(),
                target,
                "Daily challenge created"
            );
            return Ok(Some(challenge));
        }

        // Lost the race to a concurrent generator; its record wins.
        tracing::debug!(user_id, date = %today, "Daily challenge created concurrently");
        self.challenges
            .find_challenge(user_id, today)
            .await?
            .map(Some)
            .ok_or_else(|| {
                AppError::Database(format!(
                    "Challenge for {} on {} vanished after conflict",
                    user_id, today
                ))
            })
    }

    /// Today's challenge with its exercise attached, generated on demand.
    pub async fn get_today_challenge(&self, user_id: &str) -> Result<ChallengeWithExercise> {
        let challenge = self
            .generate_daily_challenge(user_id)
            .await?
            .ok_or_else(|| AppError::BadRequest("User ID is required".to_string()))?;

        self.attach_exercise(challenge).await
    }

    /// Resolve the challenge's bound exercise, if any.
    async fn attach_exercise(&self, challenge: DailyChallenge) -> Result<ChallengeWithExercise> {
        let exercise = match challenge.exercise_id.as_deref() {
            Some(id) => self.exercises.get_exercise(id).await?,
            None => None,
        };
        Ok(ChallengeWithExercise {
            challenge,
            exercise,
        })
    }

    /// Apply an activity event to today's challenge.
    ///
    /// Returns `None` if the user has no challenge today. A completed
    /// challenge, or an event that does not count, leaves it unchanged.
    pub async fn update_challenge_progress(
        &self,
        user_id: &str,
        activity_type: ActivityType,
        data: &ActivityData,
    ) -> Result<Option<DailyChallenge>> {
        let today = self.clock.today();

        let Some(challenge) = self.challenges.find_challenge(user_id, today).await? else {
            return Ok(None);
        };

        if challenge.is_completed {
            return Ok(Some(challenge));
        }

        let increment = progress_increment(&challenge, activity_type, data);
        if increment == 0 {
            return Ok(Some(challenge));
        }

        let updated = self
            .challenges
            .apply_progress(user_id, today, increment, self.clock.now_utc())
            .await?;

        if let Some(updated) = &updated {
            tracing::debug!(
                user_id,
                challenge_id = %updated.id,
                progress = updated.progress,
                target = updated.target,
                completed = updated.is_completed,
                "Challenge progress updated"
            );
        }

        Ok(updated)
    }

    /// Complete a challenge outright.
    ///
    /// Fails with `NotFound` unless the challenge exists and belongs to
    /// `user_id`. An already completed challenge is returned unchanged.
    pub async fn mark_challenge_complete(
        &self,
        user_id: &str,
        challenge_id: &str,
    ) -> Result<DailyChallenge> {
        let not_found = || AppError::NotFound("Challenge not found".to_string());

        let owned = self
            .challenges
            .get_challenge(challenge_id)
            .await?
            .filter(|c| c.user_id == user_id)
            .ok_or_else(not_found)?;

        if owned.is_completed {
            return Ok(owned);
        }

        let challenge = self
            .challenges
            .complete_challenge(challenge_id, self.clock.now_utc())
            .await?
            .ok_or_else(not_found)?;

        tracing::info!(user_id, challenge_id, "Challenge marked complete");

        Ok(challenge)
    }

    /// Totals, completion rate and current completed-challenge streak.
    pub async fn get_challenge_stats(&self, user_id: &str) -> Result<ChallengeStats> {
        let challenges = self.challenges.challenges_for_user(user_id, None).await?;
        Ok(ChallengeStats::from_challenges(&challenges, self.clock.today()))
    }

    /// Most recent challenges, newest first, with exercises attached.
    pub async fn challenge_history(
        &self,
        user_id: &str,
        limit: u32,
    ) -> Result<Vec<ChallengeWithExercise>> {
        let challenges = self
            .challenges
            .challenges_for_user(user_id, Some(limit))
            .await?;

        let mut history = Vec::with_capacity(challenges.len());
        for challenge in challenges {
            history.push(self.attach_exercise(challenge).await?);
        }
        Ok(history)
    }
}
