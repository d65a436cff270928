// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Exercise progress logging.

use crate::error::Result;
use crate::middleware::auth::AuthUser;
use crate::models::{ActivityData, ActivityRecord, ActivityType, ProgressEntry, ProgressSummary};
use crate::routes::not_blank;
use crate::services::CompletionDetails;
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::Validate;

/// Progress routes (require authentication via JWT).
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/progress", post(log_progress))
        .route("/api/progress/{user_id}", get(get_progress))
        .route("/api/progress/{user_id}/today", get(get_today_progress))
        .route("/api/progress/{user_id}/summary", get(get_progress_summary))
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct LogProgressRequest {
    #[serde(default)]
    #[validate(custom(function = "not_blank", message = "Exercise ID is required"))]
    pub exercise_id: String,
    #[serde(default)]
    #[validate(range(max = 10_000))]
    pub completed_reps: Option<u32>,
    #[serde(default)]
    #[validate(range(max = 86_400))]
    pub completed_seconds: Option<u32>,
    #[serde(default)]
    #[validate(length(max = 1000))]
    pub notes: Option<String>,
}

/// Log today's completion of an exercise, then advance the daily challenge
/// and re-check the streak. Failures of the follow-ups are logged only.
async fn log_progress(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(body): Json<LogProgressRequest>,
) -> Result<(StatusCode, Json<ActivityRecord>)> {
    body.validate()?;

    let record = state
        .progress
        .log_completion(
            &user.user_id,
            &body.exercise_id,
            CompletionDetails {
                completed_reps: body.completed_reps,
                completed_seconds: body.completed_seconds,
                notes: body.notes,
            },
        )
        .await?;

    let data = ActivityData {
        exercise_id: Some(record.exercise_id.clone()),
    };
    if let Err(e) = state
        .challenges
        .update_challenge_progress(&user.user_id, ActivityType::ExerciseCompleted, &data)
        .await
    {
        tracing::warn!(user_id = %user.user_id, error = %e, "Failed to update challenge progress");
    }

    match state.streaks.check_streak(&user.user_id).await {
        Ok(check) if !check.new_badges.is_empty() => {
            tracing::info!(
                user_id = %user.user_id,
                streak = check.current_streak,
                new_badges = check.new_badges.len(),
                "Progress unlocked streak badges"
            );
        }
        Ok(_) => {}
        Err(e) => {
            tracing::warn!(user_id = %user.user_id, error = %e, "Failed to check streak");
        }
    }

    Ok((StatusCode::CREATED, Json(record)))
}

/// A user's completions, newest first, with exercises attached.
async fn get_progress(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<ProgressEntry>>> {
    let entries = state.progress.history(&user_id).await?;
    Ok(Json(entries))
}

async fn get_today_progress(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<ProgressEntry>>> {
    let entries = state.progress.today(&user_id).await?;
    Ok(Json(entries))
}

async fn get_progress_summary(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<ProgressSummary>> {
    let summary = state.progress.summary(&user_id).await?;
    Ok(Json(summary))
}
