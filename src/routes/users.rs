// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Public user profile stats.

use crate::error::Result;
use crate::models::UserStats;
use crate::AppState;
use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use std::sync::Arc;

/// User routes (require authentication via JWT).
pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/users/{user_id}/stats", get(get_user_stats))
}

async fn get_user_stats(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<UserStats>> {
    let stats = state.users.user_stats(&user_id).await?;
    Ok(Json(stats))
}
