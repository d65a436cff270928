// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Activity streaks and milestone badges.
//!
//! A streak is the number of consecutive calendar days, ending today or
//! yesterday, with at least one logged exercise. Crossing a milestone
//! awards its badge once per user.

use crate::db::{ActivityLog, BadgeStore};
use crate::error::Result;
use crate::models::{ActivityRecord, Milestone, StreakBadge, STREAK_MILESTONES};
use crate::time_utils::{previous_day, Clock};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeSet;
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Compute the current streak from a user's activity records.
///
/// Records may be in any order and may repeat days. Returns 0 unless the
/// most recent day is `today` or the day before.
pub fn calculate_streak(records: &[ActivityRecord], today: NaiveDate) -> u32 {
    let days: BTreeSet<NaiveDate> = records.iter().map(|r| r.date).collect();
    let mut days = days.into_iter().rev();

    let Some(most_recent) = days.next() else {
        return 0;
    };

    let yesterday = previous_day(today);
    if most_recent != today && Some(most_recent) != yesterday {
        return 0;
    }

    let mut streak = 1;
    let mut current = most_recent;
    for day in days {
        if (current - day).num_days() != 1 {
            break;
        }
        streak += 1;
        current = day;
    }

    streak
}

/// Progress towards the next milestone not yet earned.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct MilestoneProgress {
    pub milestone: Milestone,
    pub current: u32,
    pub target: u32,
    /// Percent of the way there, capped at 100
    pub percentage: u32,
}

impl MilestoneProgress {
    fn new(milestone: Milestone, current: u32) -> Self {
        let percentage =
            (f64::from(current) / f64::from(milestone.days) * 100.0).round() as u32;
        Self {
            milestone,
            current,
            target: milestone.days,
            percentage: percentage.min(100),
        }
    }
}

/// Current streak, earned badges, and what comes next.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct StreakSummary {
    pub current_streak: u32,
    pub earned_badges: Vec<StreakBadge>,
    pub next_milestone: Option<MilestoneProgress>,
    pub all_milestones: Vec<Milestone>,
}

/// Result of re-evaluating a user's streak.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct StreakCheck {
    pub current_streak: u32,
    pub new_badges: Vec<StreakBadge>,
    pub message: String,
}

/// Streak evaluation and badge awarding.
pub struct StreakService {
    activities: Arc<dyn ActivityLog>,
    badges: Arc<dyn BadgeStore>,
    clock: Arc<dyn Clock>,
}

impl StreakService {
    pub fn new(
        activities: Arc<dyn ActivityLog>,
        badges: Arc<dyn BadgeStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            activities,
            badges,
            clock,
        }
    }

    /// Current streak for a user, from the activity log.
    pub async fn current_streak(&self, user_id: &str) -> Result<u32> {
        let records = self.activities.activities_for_user(user_id).await?;
        Ok(calculate_streak(&records, self.clock.today()))
    }

    /// Award every milestone badge `current_streak` has reached and the user
    /// does not hold yet. Returns only the newly awarded badges.
    ///
    /// Safe to call repeatedly: a badge that already exists, including one
    /// written by a concurrent call, is skipped.
    pub async fn check_and_award_badges(
        &self,
        user_id: &str,
        current_streak: u32,
    ) -> Result<Vec<StreakBadge>> {
        let mut new_badges = Vec::new();

        for milestone in STREAK_MILESTONES
            .iter()
            .filter(|m| m.days <= current_streak)
        {
            if self.badges.find_badge(user_id, milestone.days).await?.is_some() {
                continue;
            }

            let badge =
                StreakBadge::award(user_id, milestone, current_streak, self.clock.now_utc());

            if self.badges.insert_badge(&badge).await? {
                tracing::info!(
                    user_id,
                    milestone = milestone.days,
                    streak = current_streak,
                    "Streak badge awarded"
                );
                new_badges.push(badge);
            } else {
                tracing::debug!(
                    user_id,
                    milestone = milestone.days,
                    "Badge already awarded concurrently"
                );
            }
        }

        Ok(new_badges)
    }

    /// Recompute the streak and award any badges it unlocks.
    pub async fn check_streak(&self, user_id: &str) -> Result<StreakCheck> {
        let current_streak = self.current_streak(user_id).await?;
        let new_badges = self.check_and_award_badges(user_id, current_streak).await?;

        let message = if new_badges.is_empty() {
            "Keep going! You're building your streak.".to_string()
        } else {
            format!(
                "Congratulations! You earned {} new badge(s)!",
                new_badges.len()
            )
        };

        Ok(StreakCheck {
            current_streak,
            new_badges,
            message,
        })
    }

    /// Badges held by a user, ascending by milestone.
    pub async fn badges_for_user(&self, user_id: &str) -> Result<Vec<StreakBadge>> {
        self.badges.badges_for_user(user_id).await
    }

    /// Current streak with earned badges and the next milestone to reach.
    pub async fn streak_summary(&self, user_id: &str) -> Result<StreakSummary> {
        let current_streak = self.current_streak(user_id).await?;
        let earned_badges = self.badges.badges_for_user(user_id).await?;

        let next_milestone = STREAK_MILESTONES
            .iter()
            .find(|m| !earned_badges.iter().any(|b| b.milestone == m.days))
            .map(|m| MilestoneProgress::new(*m, current_streak));

        Ok(StreakSummary {
            current_streak,
            earned_badges,
            next_milestone,
            all_milestones: STREAK_MILESTONES.to_vec(),
        })
    }
}
