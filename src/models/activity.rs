// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Exercise activity records and activity events.

use crate::models::Exercise;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// A logged exercise completion for one user on one calendar day.
///
/// At most one record exists per (user, exercise, day).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ActivityRecord {
    /// Owner
    pub user_id: String,
    /// Completed exercise
    pub exercise_id: String,
    /// Calendar day of the activity (YYYY-MM-DD)
    pub date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_reps: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_seconds: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// When the record was written
    pub created_at: DateTime<Utc>,
}

impl ActivityRecord {
    /// Document ID: one record per user, exercise and day.
    pub fn document_id(&self) -> String {
        format!(
            "{}_{}_{}",
            super::id_part(&self.user_id),
            super::id_part(&self.exercise_id),
            self.date
        )
    }
}

/// A logged completion with its exercise resolved, for API responses.
///
/// `exercise` is `None` if the exercise was removed from the catalog.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ProgressEntry {
    #[serde(flatten)]
    pub record: ActivityRecord,
    pub exercise: Option<Exercise>,
}

/// Kind of user activity that can advance a daily challenge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityType {
    ExerciseCompleted,
    #[serde(other)]
    Other,
}

impl ActivityType {
    /// Parse a wire name. Unknown names are `Other`.
    pub fn parse(name: &str) -> Self {
        match name.trim() {
            "exercise_completed" => Self::ExerciseCompleted,
            _ => Self::Other,
        }
    }
}

/// Optional payload attached to an activity event.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ActivityData {
    #[serde(default)]
    pub exercise_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_activity_type_parses_unknown_as_other() {
        let parsed: ActivityType = serde_json::from_str("\"exercise_completed\"").unwrap();
        assert_eq!(parsed, ActivityType::ExerciseCompleted);

        let parsed: ActivityType = serde_json::from_str("\"journal_written\"").unwrap();
        assert_eq!(parsed, ActivityType::Other);

        assert_eq!(
            ActivityType::parse("exercise_completed"),
            ActivityType::ExerciseCompleted
        );
        assert_eq!(ActivityType::parse("streak_viewed"), ActivityType::Other);
    }

    #[test]
    fn test_document_id_is_per_user_exercise_day() {
        let record = ActivityRecord {
            user_id: "u1".to_string(),
            exercise_id: "plank".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            completed_reps: None,
            completed_seconds: Some(60),
            notes: None,
            created_at: Utc::now(),
        };
        assert_eq!(record.document_id(), "u1_plank_2024-01-15");
    }

    #[test]
    fn test_document_id_keeps_parts_apart() {
        let record = |user: &str, exercise: &str| ActivityRecord {
            user_id: user.to_string(),
            exercise_id: exercise.to_string(),
            date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            completed_reps: None,
            completed_seconds: None,
            notes: None,
            created_at: Utc::now(),
        };

        let first = record("bob", "jumping_jacks");
        let second = record("bob_jumping", "jacks");
        assert_ne!(first.document_id(), second.document_id());
        assert_eq!(first.document_id(), "bob_jumping%5Fjacks_2024-01-15");
    }
}
