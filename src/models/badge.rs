// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Streak milestones and the badges awarded for reaching them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// A streak length that unlocks a badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Milestone {
    pub days: u32,
    pub name: &'static str,
    pub icon: &'static str,
    pub description: &'static str,
}

/// All milestones, ascending by `days`.
pub const STREAK_MILESTONES: [Milestone; 5] = [
    Milestone {
        days: 7,
        name: "Week Warrior",
        icon: "fa-fire",
        description: "7-day streak achieved!",
    },
    Milestone {
        days: 14,
        name: "Fortnight Fighter",
        icon: "fa-bolt",
        description: "14-day streak achieved!",
    },
    Milestone {
        days: 30,
        name: "Month Master",
        icon: "fa-trophy",
        description: "30-day streak achieved!",
    },
    Milestone {
        days: 60,
        name: "Consistency Champion",
        icon: "fa-dumbbell",
        description: "60-day streak achieved!",
    },
    Milestone {
        days: 100,
        name: "Century Club",
        icon: "fa-star",
        description: "100-day streak achieved!",
    },
];

/// Badge earned by a user for reaching a streak milestone.
///
/// At most one badge exists per (user, milestone). Badges are never
/// modified once written.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct StreakBadge {
    /// Document ID (`{user_id}_{milestone}`)
    pub id: String,
    pub user_id: String,
    /// Milestone length in days
    pub milestone: u32,
    pub name: String,
    pub icon: String,
    pub description: String,
    pub earned_at: DateTime<Utc>,
    /// The streak count when the badge was earned
    pub streak_count: u32,
}

impl StreakBadge {
    /// Build the badge for `milestone`, earned with `streak_count` at `now`.
    pub fn award(
        user_id: &str,
        milestone: &Milestone,
        streak_count: u32,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Self::document_id(user_id, milestone.days),
            user_id: user_id.to_string(),
            milestone: milestone.days,
            name: milestone.name.to_string(),
            icon: milestone.icon.to_string(),
            description: milestone.description.to_string(),
            earned_at: now,
            streak_count,
        }
    }

    /// Document ID: one badge per user and milestone.
    pub fn document_id(user_id: &str, milestone: u32) -> String {
        format!("{}_{}", super::id_part(user_id), milestone)
    }
}
