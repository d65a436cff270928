// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Per-user totals for profile pages.

use crate::db::{ActivityLog, ChallengeStore, UserDirectory};
use crate::error::{AppError, Result};
use crate::models::UserStats;
use crate::services::streak::calculate_streak;
use crate::time_utils::Clock;
use std::sync::Arc;

pub struct UserStatsService {
    users: Arc<dyn UserDirectory>,
    activities: Arc<dyn ActivityLog>,
    challenges: Arc<dyn ChallengeStore>,
    clock: Arc<dyn Clock>,
}

impl UserStatsService {
    pub fn new(
        users: Arc<dyn UserDirectory>,
        activities: Arc<dyn ActivityLog>,
        challenges: Arc<dyn ChallengeStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            users,
            activities,
            challenges,
            clock,
        }
    }

    /// Completions, live streak and completed challenges for `user_id`.
    ///
    /// Fails with `NotFound` if the user is not registered.
    pub async fn user_stats(&self, user_id: &str) -> Result<UserStats> {
        let user = self
            .users
            .get_user(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        let records = self.activities.activities_for_user(user_id).await?;
        let streak = calculate_streak(&records, self.clock.today());
        let challenges = self.challenges.challenges_for_user(user_id, None).await?;

        Ok(UserStats::new(&user, &records, streak, &challenges))
    }
}
