// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use chrono::{NaiveDate, Utc};
use fitstreak::config::Config;
use fitstreak::db::{FirestoreDb, MemoryDb};
use fitstreak::middleware::auth::create_jwt;
use fitstreak::models::exercise::{Difficulty, ExerciseType};
use fitstreak::models::{ActivityRecord, ChallengeType, DailyChallenge, Exercise, User};
use fitstreak::routes::create_router;
use fitstreak::time_utils::{Clock, FixedClock};
use fitstreak::AppState;
use rand::{rngs::StdRng, SeedableRng};
use std::sync::Arc;

/// Seed for the challenge RNG in tests.
#[allow(dead_code)]
pub const RNG_SEED: u64 = 42;

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// The day every test app treats as "today".
#[allow(dead_code)]
pub fn test_today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
}

/// Clock pinned to noon on [`test_today`].
#[allow(dead_code)]
pub fn test_clock() -> Arc<dyn Clock> {
    Arc::new(FixedClock::at_noon(test_today()))
}

/// Create a test app backed by an in-memory store and a fixed clock.
/// Returns the router, the shared state and the store.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>, Arc<MemoryDb>) {
    let db = Arc::new(MemoryDb::new());
    let state = Arc::new(AppState::with_rng(
        Config::default(),
        db.clone(),
        test_clock(),
        StdRng::seed_from_u64(RNG_SEED),
    ));

    (create_router(state.clone()), state, db)
}

/// Create a test JWT token.
#[allow(dead_code)]
pub fn create_test_jwt(user_id: &str, signing_key: &[u8]) -> String {
    create_jwt(user_id, signing_key).expect("Failed to create test JWT")
}

#[allow(dead_code)]
pub fn make_exercise(id: &str, name: &str) -> Exercise {
    Exercise {
        id: id.to_string(),
        name: name.to_string(),
        description: None,
        exercise_type: ExerciseType::Core,
        difficulty: Difficulty::Easy,
        demonstration: None,
        duration: Some(30),
        reps: None,
    }
}

/// Add an exercise to the in-memory catalog.
#[allow(dead_code)]
pub fn seed_exercise(db: &MemoryDb, id: &str, name: &str) -> Exercise {
    let exercise = make_exercise(id, name);
    db.upsert_exercise(exercise.clone());
    exercise
}

#[allow(dead_code)]
pub fn seed_user(db: &MemoryDb, id: &str) -> User {
    let user = User {
        id: id.to_string(),
        username: format!("{}-name", id),
        email: format!("{}@example.com", id),
        created_at: Utc::now(),
    };
    db.upsert_user(user.clone());
    user
}

/// An activity record `days_ago` days before [`test_today`].
#[allow(dead_code)]
pub fn activity(user_id: &str, exercise_id: &str, days_ago: u64) -> ActivityRecord {
    ActivityRecord {
        user_id: user_id.to_string(),
        exercise_id: exercise_id.to_string(),
        date: test_today()
            .checked_sub_days(chrono::Days::new(days_ago))
            .unwrap(),
        completed_reps: None,
        completed_seconds: None,
        notes: None,
        created_at: Utc::now(),
    }
}

/// Read a response body as JSON.
#[allow(dead_code)]
pub async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body");
    serde_json::from_slice(&bytes).expect("Body is not JSON")
}

/// A fresh challenge for `user_id` on `date`.
#[allow(dead_code)]
pub fn make_challenge(
    user_id: &str,
    date: NaiveDate,
    challenge_type: ChallengeType,
    target: u32,
    exercise_id: Option<&str>,
) -> DailyChallenge {
    let now = Utc::now();
    DailyChallenge {
        id: DailyChallenge::document_id(user_id, date),
        user_id: user_id.to_string(),
        date,
        challenge_type,
        title: format!("Test {}", challenge_type.as_str()),
        description: String::new(),
        target,
        progress: 0,
        is_completed: false,
        completed_at: None,
        exercise_id: exercise_id.map(String::from),
        reward: "🎉 Great job!".to_string(),
        created_at: now,
        updated_at: now,
    }
}
