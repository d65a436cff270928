// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Daily challenge generation, progress and stats against the in-memory store.

use chrono::Days;
use fitstreak::db::{ChallengeStore, MemoryDb};
use fitstreak::error::AppError;
use fitstreak::models::{ActivityData, ActivityType, ChallengeType};
use fitstreak::services::DailyChallengeService;
use rand::{rngs::StdRng, SeedableRng};
use std::sync::Arc;

mod common;

fn challenge_service(db: &Arc<MemoryDb>) -> DailyChallengeService {
    DailyChallengeService::with_rng(
        db.clone(),
        db.clone(),
        common::test_clock(),
        StdRng::seed_from_u64(common::RNG_SEED),
    )
}

fn completed(exercise_id: &str) -> ActivityData {
    ActivityData {
        exercise_id: Some(exercise_id.to_string()),
    }
}

#[tokio::test]
async fn test_generation_is_idempotent() {
    let db = Arc::new(MemoryDb::new());
    common::seed_exercise(&db, "plank", "Plank");
    let service = challenge_service(&db);

    let first = service
        .generate_daily_challenge("user-1")
        .await
        .unwrap()
        .unwrap();
    let second = service
        .generate_daily_challenge("user-1")
        .await
        .unwrap()
        .unwrap();

    assert_eq!(first, second);
    assert_eq!(first.date, common::test_today());
    assert_eq!(first.progress, 0);
    assert!(!first.is_completed);
    assert_eq!(
        db.challenges_for_user("user-1", None).await.unwrap().len(),
        1
    );
}

#[tokio::test]
async fn test_blank_user_generates_nothing() {
    let db = Arc::new(MemoryDb::new());
    let service = challenge_service(&db);

    assert!(service.generate_daily_challenge("").await.unwrap().is_none());
    assert!(service
        .generate_daily_challenge("   ")
        .await
        .unwrap()
        .is_none());

    let err = service.get_today_challenge("").await.unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));
}

#[tokio::test]
async fn test_concurrent_generation_yields_one_challenge() {
    let db = Arc::new(MemoryDb::new());
    common::seed_exercise(&db, "plank", "Plank");
    let service = Arc::new(challenge_service(&db));

    let handles: Vec<_> = (0..16)
        .map(|_| {
            let service = service.clone();
            tokio::spawn(async move { service.generate_daily_challenge("user-1").await })
        })
        .collect();

    let mut results = Vec::new();
    for handle in handles {
        results.push(handle.await.unwrap().unwrap().unwrap());
    }

    let stored = db.challenges_for_user("user-1", None).await.unwrap();
    assert_eq!(stored.len(), 1);
    assert!(results.iter().all(|c| *c == stored[0]));
}

#[tokio::test]
async fn test_generated_challenges_respect_templates() {
    let db = Arc::new(MemoryDb::new());
    common::seed_exercise(&db, "plank", "Plank");
    let service = challenge_service(&db);

    for i in 0..60 {
        let user_id = format!("user-{}", i);
        let challenge = service
            .generate_daily_challenge(&user_id)
            .await
            .unwrap()
            .unwrap();

        let (min, max) = match challenge.challenge_type {
            ChallengeType::CompleteExercises => (2, 5),
            ChallengeType::SpecificExercise => (1, 1),
            ChallengeType::VarietyChallenge => (3, 5),
            ChallengeType::ExerciseStreak => (1, 1),
            ChallengeType::TimeChallenge => panic!("time challenges are never generated"),
        };
        assert!((min..=max).contains(&challenge.target));

        if challenge.challenge_type == ChallengeType::SpecificExercise {
            assert_eq!(challenge.exercise_id.as_deref(), Some("plank"));
            assert!(challenge.title.contains("Plank"));
        } else {
            assert!(challenge.exercise_id.is_none());
        }
    }
}

#[tokio::test]
async fn test_specific_exercise_with_empty_catalog_is_unbound() {
    let db = Arc::new(MemoryDb::new());
    let service = challenge_service(&db);

    let specific = {
        let mut found = None;
        for i in 0..60 {
            let challenge = service
                .generate_daily_challenge(&format!("user-{}", i))
                .await
                .unwrap()
                .unwrap();
            if challenge.challenge_type == ChallengeType::SpecificExercise {
                found = Some(challenge);
                break;
            }
        }
        found.expect("no specific_exercise challenge in 60 draws")
    };

    assert!(specific.exercise_id.is_none());
    assert_eq!(specific.target, 1);
    assert_eq!(specific.title, "Master: ");
    assert_eq!(
        specific.description,
        "Focus on the  exercise today. Complete it to finish the challenge."
    );

    // Nothing to attach, and progress events cannot advance it.
    let today = service.get_today_challenge(&specific.user_id).await.unwrap();
    assert!(today.exercise.is_none());
    let unchanged = service
        .update_challenge_progress(
            &specific.user_id,
            ActivityType::ExerciseCompleted,
            &completed("plank"),
        )
        .await
        .unwrap()
        .unwrap();
    assert_eq!(unchanged.progress, 0);
}

#[tokio::test]
async fn test_today_challenge_attaches_exercise() {
    let db = Arc::new(MemoryDb::new());
    common::seed_exercise(&db, "plank", "Plank");
    let service = challenge_service(&db);

    let challenge = common::make_challenge(
        "user-1",
        common::test_today(),
        ChallengeType::SpecificExercise,
        1,
        Some("plank"),
    );
    db.insert_challenge(&challenge).await.unwrap();

    let today = service.get_today_challenge("user-1").await.unwrap();
    assert_eq!(today.challenge, challenge);
    assert_eq!(today.exercise.unwrap().name, "Plank");
}

#[tokio::test]
async fn test_progress_caps_at_target_and_completes_once() {
    let db = Arc::new(MemoryDb::new());
    let service = challenge_service(&db);

    let challenge = common::make_challenge(
        "user-1",
        common::test_today(),
        ChallengeType::CompleteExercises,
        2,
        None,
    );
    db.insert_challenge(&challenge).await.unwrap();

    let after_one = service
        .update_challenge_progress("user-1", ActivityType::ExerciseCompleted, &completed("a"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(after_one.progress, 1);
    assert!(!after_one.is_completed);

    let after_two = service
        .update_challenge_progress("user-1", ActivityType::ExerciseCompleted, &completed("b"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(after_two.progress, 2);
    assert!(after_two.is_completed);
    let completed_at = after_two.completed_at;
    assert!(completed_at.is_some());

    let after_three = service
        .update_challenge_progress("user-1", ActivityType::ExerciseCompleted, &completed("c"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(after_three.progress, 2);
    assert_eq!(after_three.completed_at, completed_at);
}

#[tokio::test]
async fn test_concurrent_progress_never_exceeds_target() {
    let db = Arc::new(MemoryDb::new());
    let service = Arc::new(challenge_service(&db));

    let challenge = common::make_challenge(
        "user-1",
        common::test_today(),
        ChallengeType::VarietyChallenge,
        3,
        None,
    );
    db.insert_challenge(&challenge).await.unwrap();

    let handles: Vec<_> = (0..10)
        .map(|i| {
            let service = service.clone();
            tokio::spawn(async move {
                service
                    .update_challenge_progress(
                        "user-1",
                        ActivityType::ExerciseCompleted,
                        &completed(&format!("ex-{}", i)),
                    )
                    .await
            })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let stored = db.get_challenge(&challenge.id).await.unwrap().unwrap();
    assert_eq!(stored.progress, 3);
    assert!(stored.is_completed);
}

#[tokio::test]
async fn test_progress_ignores_other_events_and_missing_challenge() {
    let db = Arc::new(MemoryDb::new());
    let service = challenge_service(&db);

    let none = service
        .update_challenge_progress("user-1", ActivityType::ExerciseCompleted, &completed("a"))
        .await
        .unwrap();
    assert!(none.is_none());

    let challenge = common::make_challenge(
        "user-1",
        common::test_today(),
        ChallengeType::TimeChallenge,
        10,
        None,
    );
    db.insert_challenge(&challenge).await.unwrap();

    let unchanged = service
        .update_challenge_progress("user-1", ActivityType::ExerciseCompleted, &completed("a"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(unchanged.progress, 0);

    let unchanged = service
        .update_challenge_progress("user-1", ActivityType::Other, &ActivityData::default())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(unchanged.progress, 0);
}

#[tokio::test]
async fn test_mark_complete_is_noop_when_completed() {
    let db = Arc::new(MemoryDb::new());
    let service = challenge_service(&db);

    let challenge = common::make_challenge(
        "user-1",
        common::test_today(),
        ChallengeType::ExerciseStreak,
        1,
        None,
    );
    db.insert_challenge(&challenge).await.unwrap();

    let first = service
        .mark_challenge_complete("user-1", &challenge.id)
        .await
        .unwrap();
    assert!(first.is_completed);
    assert_eq!(first.progress, 1);

    let second = service
        .mark_challenge_complete("user-1", &challenge.id)
        .await
        .unwrap();
    assert_eq!(second.completed_at, first.completed_at);

    let err = service
        .mark_challenge_complete("someone-else", &challenge.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn test_complete_keeps_completion_from_progress() {
    let db = Arc::new(MemoryDb::new());

    let challenge = common::make_challenge(
        "user-1",
        common::test_today(),
        ChallengeType::CompleteExercises,
        2,
        None,
    );
    db.insert_challenge(&challenge).await.unwrap();

    let progressed_at = chrono::Utc::now();
    let progressed = db
        .apply_progress("user-1", common::test_today(), 2, progressed_at)
        .await
        .unwrap()
        .unwrap();
    assert!(progressed.is_completed);

    // A completion request that read the challenge before progress landed.
    let later = progressed_at + chrono::Duration::minutes(10);
    let completed = db
        .complete_challenge(&challenge.id, later)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(completed.completed_at, Some(progressed_at));
    assert_eq!(completed.updated_at, progressed_at);

    let stored = db.get_challenge(&challenge.id).await.unwrap().unwrap();
    assert_eq!(stored.completed_at, Some(progressed_at));
    assert_eq!(stored.progress, 2);

    assert!(db
        .complete_challenge("missing_2024-01-15", later)
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_concurrent_complete_and_progress_agree() {
    let db = Arc::new(MemoryDb::new());
    let service = Arc::new(challenge_service(&db));

    let challenge = common::make_challenge(
        "user-1",
        common::test_today(),
        ChallengeType::CompleteExercises,
        5,
        None,
    );
    db.insert_challenge(&challenge).await.unwrap();

    let mut handles = Vec::new();
    for i in 0..8 {
        let service = service.clone();
        let challenge_id = challenge.id.clone();
        handles.push(tokio::spawn(async move {
            if i % 2 == 0 {
                service
                    .mark_challenge_complete("user-1", &challenge_id)
                    .await
                    .map(Some)
            } else {
                service
                    .update_challenge_progress(
                        "user-1",
                        ActivityType::ExerciseCompleted,
                        &completed("plank"),
                    )
                    .await
            }
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let stored = db.get_challenge(&challenge.id).await.unwrap().unwrap();
    assert!(stored.is_completed);
    assert_eq!(stored.progress, 5);
    assert!(stored.completed_at.is_some());
}

#[tokio::test]
async fn test_challenge_stats() {
    let db = Arc::new(MemoryDb::new());
    let service = challenge_service(&db);

    let stats = service.get_challenge_stats("user-1").await.unwrap();
    assert_eq!(stats.total, 0);
    assert_eq!(stats.completion_rate, 0.0);
    assert_eq!(stats.current_streak, 0);

    // Today and yesterday completed, two days ago open, three days ago completed.
    for (days_ago, done) in [(0, true), (1, true), (2, false), (3, true)] {
        let date = common::test_today()
            .checked_sub_days(Days::new(days_ago))
            .unwrap();
        let mut challenge =
            common::make_challenge("user-1", date, ChallengeType::CompleteExercises, 2, None);
        if done {
            challenge.mark_complete(chrono::Utc::now());
        }
        db.insert_challenge(&challenge).await.unwrap();
    }

    let stats = service.get_challenge_stats("user-1").await.unwrap();
    assert_eq!(stats.total, 4);
    assert_eq!(stats.completed, 3);
    assert_eq!(stats.completion_rate, 75.0);
    assert_eq!(stats.current_streak, 2);
}

#[tokio::test]
async fn test_history_newest_first_with_limit() {
    let db = Arc::new(MemoryDb::new());
    common::seed_exercise(&db, "plank", "Plank");
    let service = challenge_service(&db);

    for days_ago in [3, 0, 1] {
        let date = common::test_today()
            .checked_sub_days(Days::new(days_ago))
            .unwrap();
        db.insert_challenge(&common::make_challenge(
            "user-1",
            date,
            ChallengeType::SpecificExercise,
            1,
            Some("plank"),
        ))
        .await
        .unwrap();
    }

    let history = service.challenge_history("user-1", 2).await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].challenge.date, common::test_today());
    assert!(history.iter().all(|c| c.exercise.is_some()));
}
