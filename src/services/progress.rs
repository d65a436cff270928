// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Exercise completion logging and the user's progress views.

use crate::db::{ActivityLog, ExerciseCatalog};
use crate::error::{AppError, Result};
use crate::models::{ActivityRecord, Exercise, ProgressEntry, ProgressSummary};
use crate::time_utils::Clock;
use std::collections::HashMap;
use std::sync::Arc;

/// What the user reported for a completed exercise.
#[derive(Debug, Clone, Default)]
pub struct CompletionDetails {
    pub completed_reps: Option<u32>,
    pub completed_seconds: Option<u32>,
    pub notes: Option<String>,
}

/// Records exercise completions, one per exercise per day.
pub struct ProgressService {
    activities: Arc<dyn ActivityLog>,
    exercises: Arc<dyn ExerciseCatalog>,
    clock: Arc<dyn Clock>,
}

impl ProgressService {
    pub fn new(
        activities: Arc<dyn ActivityLog>,
        exercises: Arc<dyn ExerciseCatalog>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            activities,
            exercises,
            clock,
        }
    }

    /// Log that `user_id` completed `exercise_id` today.
    ///
    /// Fails with `NotFound` for an unknown exercise and `BadRequest` if the
    /// exercise was already logged today.
    pub async fn log_completion(
        &self,
        user_id: &str,
        exercise_id: &str,
        details: CompletionDetails,
    ) -> Result<ActivityRecord> {
        if self.exercises.get_exercise(exercise_id).await?.is_none() {
            return Err(AppError::NotFound(format!(
                "Exercise {} not found",
                exercise_id
            )));
        }

        let record = ActivityRecord {
            user_id: user_id.to_string(),
            exercise_id: exercise_id.to_string(),
            date: self.clock.today(),
            completed_reps: details.completed_reps,
            completed_seconds: details.completed_seconds,
            notes: details.notes,
            created_at: self.clock.now_utc(),
        };

        if !self.activities.insert_activity(&record).await? {
            return Err(AppError::BadRequest(
                "Progress for today already submitted".to_string(),
            ));
        }

        tracing::info!(user_id, exercise_id, date = %record.date, "Exercise completion logged");

        Ok(record)
    }

    /// Every completion for `user_id`, newest day first.
    pub async fn history(&self, user_id: &str) -> Result<Vec<ProgressEntry>> {
        let records = self.activities.activities_for_user(user_id).await?;
        self.attach_exercises(records).await
    }

    /// Completions logged today.
    pub async fn today(&self, user_id: &str) -> Result<Vec<ProgressEntry>> {
        let today = self.clock.today();
        let records: Vec<ActivityRecord> = self
            .activities
            .activities_for_user(user_id)
            .await?
            .into_iter()
            .filter(|r| r.date == today)
            .collect();
        self.attach_exercises(records).await
    }

    pub async fn summary(&self, user_id: &str) -> Result<ProgressSummary> {
        let records = self.activities.activities_for_user(user_id).await?;
        Ok(ProgressSummary::from_records(&records))
    }

    /// Resolve each record's exercise, fetching every exercise once.
    async fn attach_exercises(&self, records: Vec<ActivityRecord>) -> Result<Vec<ProgressEntry>> {
        let mut exercises: HashMap<String, Option<Exercise>> = HashMap::new();
        let mut entries = Vec::with_capacity(records.len());

        for record in records {
            let exercise = match exercises.get(&record.exercise_id) {
                Some(cached) => cached.clone(),
                None => {
                    let fetched = self.exercises.get_exercise(&record.exercise_id).await?;
                    exercises.insert(record.exercise_id.clone(), fetched.clone());
                    fetched
                }
            };
            entries.push(ProgressEntry { record, exercise });
        }

        Ok(entries)
    }
}
