//! Challenge statistics aggregates.
//!
//! Computed on demand from a user's challenge history.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use std::collections::BTreeSet;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::models::{ActivityRecord, DailyChallenge, User};
use crate::time_utils::previous_day;

/// Completion statistics for a user's daily challenges.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ChallengeStats {
    /// Total challenges ever issued
    pub total: u32,
    /// Challenges completed
    pub completed: u32,
    /// Percentage completed, one decimal place
    pub completion_rate: f64,
    /// Consecutive days, ending today, with a completed challenge
    pub current_streak: u32,
}

impl ChallengeStats {
    /// Aggregate stats from a user's challenges (any order).
    pub fn from_challenges(challenges: &[DailyChallenge], today: NaiveDate) -> Self {
        let total = challenges.len() as u32;
        let completed = challenges.iter().filter(|c| c.is_completed).count() as u32;

        let completion_rate = if total > 0 {
            (f64::from(completed) / f64::from(total) * 1000.0).round() / 10.0
        } else {
            0.0
        };

        Self {
            total,
            completed,
            completion_rate,
            current_streak: completed_challenge_streak(challenges, today),
        }
    }
}

/// Totals over a user's whole activity log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ProgressSummary {
    /// Completions ever logged
    pub total_completed: u32,
    /// Length of the most recent run of consecutive active days
    pub streak: u32,
}

impl ProgressSummary {
    /// Summarize a user's records (any order).
    ///
    /// Unlike the live streak, `streak` does not require the run to reach
    /// today or yesterday.
    pub fn from_records(records: &[ActivityRecord]) -> Self {
        Self {
            total_completed: records.len() as u32,
            streak: latest_run(records),
        }
    }
}

/// Consecutive distinct days ending at the most recent active day.
fn latest_run(records: &[ActivityRecord]) -> u32 {
    let days: BTreeSet<NaiveDate> = records.iter().map(|r| r.date).collect();
    let mut days = days.into_iter().rev();

    let Some(mut current) = days.next() else {
        return 0;
    };

    let mut run = 1;
    for day in days {
        if previous_day(current) != Some(day) {
            break;
        }
        run += 1;
        current = day;
    }
    run
}

/// Public per-user totals for profile and leaderboard views.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct UserStats {
    pub id: String,
    pub username: String,
    /// Exercise completions ever logged
    pub total_cards: u32,
    /// Live streak: 0 unless the user was active today or yesterday
    pub current_streak: u32,
    pub completed_challenges: u32,
    pub joined_at: DateTime<Utc>,
}

impl UserStats {
    pub fn new(
        user: &User,
        records: &[ActivityRecord],
        current_streak: u32,
        challenges: &[DailyChallenge],
    ) -> Self {
        Self {
            id: user.id.clone(),
            username: user.username.clone(),
            total_cards: records.len() as u32,
            current_streak,
            completed_challenges: challenges.iter().filter(|c| c.is_completed).count() as u32,
            joined_at: user.created_at,
        }
    }
}

/// Count consecutive days, walking back from `today`, with a completed challenge.
///
/// A missing day or an incomplete challenge stops the count. Challenges
/// dated after the day being checked are skipped.
pub fn completed_challenge_streak(challenges: &[DailyChallenge], today: NaiveDate) -> u32 {
    let mut sorted: Vec<&DailyChallenge> = challenges.iter().collect();
    sorted.sort_by(|a, b| b.date.cmp(&a.date));

    let mut streak = 0;
    let mut expected = today;

    for challenge in sorted {
        if challenge.date > expected {
            continue;
        }
        if challenge.date < expected || !challenge.is_completed {
            break;
        }

        streak += 1;
        match previous_day(expected) {
            Some(day) => expected = day,
            None => break,
        }
    }

    streak
}
