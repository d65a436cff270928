// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Exercise catalog routes.

use crate::error::{AppError, Result};
use crate::models::exercise::{Difficulty, ExerciseType};
use crate::models::Exercise;
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;

/// Catalog routes (require authentication via JWT).
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/exercises", get(list_exercises))
        .route("/api/exercises/{exercise_id}", get(get_exercise))
}

/// Optional catalog filters. Unknown values are rejected by the extractor.
#[derive(Debug, Default, Deserialize)]
pub struct ExerciseFilter {
    pub difficulty: Option<Difficulty>,
    #[serde(rename = "type")]
    pub exercise_type: Option<ExerciseType>,
}

impl ExerciseFilter {
    fn matches(&self, exercise: &Exercise) -> bool {
        self.difficulty.map_or(true, |d| d == exercise.difficulty)
            && self.exercise_type.map_or(true, |t| t == exercise.exercise_type)
    }
}

async fn list_exercises(
    State(state): State<Arc<AppState>>,
    Query(filter): Query<ExerciseFilter>,
) -> Result<Json<Vec<Exercise>>> {
    let exercises = state
        .catalog
        .list_exercises()
        .await?
        .into_iter()
        .filter(|e| filter.matches(e))
        .collect();
    Ok(Json(exercises))
}

async fn get_exercise(
    State(state): State<Arc<AppState>>,
    Path(exercise_id): Path<String>,
) -> Result<Json<Exercise>> {
    state
        .catalog
        .get_exercise(&exercise_id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Exercise {} not found", exercise_id)))
}
