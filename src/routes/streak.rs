// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Streak and badge routes.

use crate::error::Result;
use crate::middleware::auth::AuthUser;
use crate::models::StreakBadge;
use crate::services::{StreakCheck, StreakSummary};
use crate::AppState;
use axum::{
    extract::{Path, State},
    routing::{get, post},
    Extension, Json, Router,
};
use std::sync::Arc;

/// Streak routes (require authentication via JWT).
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/streak/badges", get(get_own_badges))
        .route("/api/streak/badges/{user_id}", get(get_user_badges))
        .route("/api/streak/current", get(get_current_streak))
        .route("/api/streak/check", post(check_streak))
}

async fn get_own_badges(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<StreakBadge>>> {
    let badges = state.streaks.badges_for_user(&user.user_id).await?;
    Ok(Json(badges))
}

/// Badges held by another user, for profile pages.
async fn get_user_badges(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<StreakBadge>>> {
    let badges = state.streaks.badges_for_user(&user_id).await?;
    Ok(Json(badges))
}

async fn get_current_streak(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<StreakSummary>> {
    let summary = state.streaks.streak_summary(&user.user_id).await?;
    Ok(Json(summary))
}

/// Recompute the streak and award newly reached badges.
async fn check_streak(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<StreakCheck>> {
    let check = state.streaks.check_streak(&user.user_id).await?;
    Ok(Json(check))
}
