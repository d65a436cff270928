// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Daily challenge routes.

use crate::error::Result;
use crate::middleware::auth::AuthUser;
use crate::models::{ActivityData, ActivityType, ChallengeStats, ChallengeWithExercise, DailyChallenge};
use crate::routes::not_blank;
use crate::AppState;
use axum::{
    extract::{Query, State},
    routing::{get, post},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::Validate;

/// Daily challenge routes (require authentication via JWT).
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/daily-challenge", get(get_today_challenge))
        .route("/api/daily-challenge/complete", post(complete_challenge))
        .route("/api/daily-challenge/progress", post(record_progress))
        .route("/api/daily-challenge/stats", get(get_stats))
        .route("/api/daily-challenge/history", get(get_history))
}

/// Today's challenge, generated on first request of the day.
async fn get_today_challenge(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<ChallengeWithExercise>> {
    let challenge = state.challenges.get_today_challenge(&user.user_id).await?;
    Ok(Json(challenge))
}

// ─── Completion ──────────────────────────────────────────────

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct CompleteChallengeRequest {
    #[serde(default)]
    #[validate(custom(function = "not_blank", message = "Challenge ID is required"))]
    pub challenge_id: String,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct CompleteChallengeResponse {
    pub message: String,
    pub challenge: DailyChallenge,
}

async fn complete_challenge(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(body): Json<CompleteChallengeRequest>,
) -> Result<Json<CompleteChallengeResponse>> {
    body.validate()?;

    let challenge = state
        .challenges
        .mark_challenge_complete(&user.user_id, &body.challenge_id)
        .await?;

    Ok(Json(CompleteChallengeResponse {
        message: "Challenge completed!".to_string(),
        challenge,
    }))
}

// ─── Progress Events ─────────────────────────────────────────

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ProgressEventRequest {
    #[serde(default)]
    #[validate(custom(function = "not_blank", message = "Activity type is required"))]
    pub activity_type: String,
    #[serde(default)]
    pub data: Option<ActivityData>,
}

/// Apply an activity event to today's challenge. Responds `null` when the
/// user has no challenge today.
async fn record_progress(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(body): Json<ProgressEventRequest>,
) -> Result<Json<Option<DailyChallenge>>> {
    body.validate()?;

    let data = body.data.unwrap_or_default();
    let updated = state
        .challenges
        .update_challenge_progress(&user.user_id, ActivityType::parse(&body.activity_type), &data)
        .await?;

    Ok(Json(updated))
}

// ─── Stats & History ─────────────────────────────────────────

async fn get_stats(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<ChallengeStats>> {
    let stats = state.challenges.get_challenge_stats(&user.user_id).await?;
    Ok(Json(stats))
}

#[derive(Deserialize)]
struct HistoryQuery {
    #[serde(default = "default_history_limit")]
    limit: u32,
}

fn default_history_limit() -> u32 {
    30
}

const MAX_HISTORY_LIMIT: u32 = 100;

async fn get_history(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(params): Query<HistoryQuery>,
) -> Result<Json<Vec<ChallengeWithExercise>>> {
    let limit = params.limit.clamp(1, MAX_HISTORY_LIMIT);
    let history = state
        .challenges
        .challenge_history(&user.user_id, limit)
        .await?;
    Ok(Json(history))
}
