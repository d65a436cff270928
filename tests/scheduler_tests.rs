// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Midnight challenge scheduler tests.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use fitstreak::db::{ChallengeStore, MemoryDb, UserDirectory};
use fitstreak::error::{AppError, Result};
use fitstreak::models::{DailyChallenge, User};
use fitstreak::services::{BatchReport, ChallengeScheduler, DailyChallengeService, SchedulerState};
use fitstreak::time_utils::{duration_until_next_midnight, Clock};
use rand::{rngs::StdRng, SeedableRng};
use std::sync::Arc;
use std::time::Duration;

mod common;

/// Challenge store that fails every write for users whose ID starts with "bad".
struct FlakyChallenges(Arc<MemoryDb>);

fn check_user(user_id: &str) -> Result<()> {
    if user_id.starts_with("bad") {
        return Err(AppError::Database(format!("write refused for {}", user_id)));
    }
    Ok(())
}

#[async_trait]
impl ChallengeStore for FlakyChallenges {
    async fn find_challenge(
        &self,
        user_id: &str,
        date: NaiveDate,
    ) -> Result<Option<DailyChallenge>> {
        self.0.find_challenge(user_id, date).await
    }

    async fn get_challenge(&self, challenge_id: &str) -> Result<Option<DailyChallenge>> {
        self.0.get_challenge(challenge_id).await
    }

    async fn insert_challenge(&self, challenge: &DailyChallenge) -> Result<bool> {
        check_user(&challenge.user_id)?;
        self.0.insert_challenge(challenge).await
    }

    async fn apply_progress(
        &self,
        user_id: &str,
        date: NaiveDate,
        increment: u32,
        now: DateTime<Utc>,
    ) -> Result<Option<DailyChallenge>> {
        self.0.apply_progress(user_id, date, increment, now).await
    }

    async fn complete_challenge(
        &self,
        challenge_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<DailyChallenge>> {
        self.0.complete_challenge(challenge_id, now).await
    }

    async fn challenges_for_user(
        &self,
        user_id: &str,
        limit: Option<u32>,
    ) -> Result<Vec<DailyChallenge>> {
        self.0.challenges_for_user(user_id, limit).await
    }
}

/// User directory that is always unavailable.
struct DownDirectory;

#[async_trait]
impl UserDirectory for DownDirectory {
    async fn list_users(&self, _limit: u32) -> Result<Vec<User>> {
        Err(AppError::Database("directory unavailable".to_string()))
    }

    async fn get_user(&self, _user_id: &str) -> Result<Option<User>> {
        Ok(None)
    }
}

fn challenge_service(store: Arc<dyn ChallengeStore>, db: &Arc<MemoryDb>) -> Arc<DailyChallengeService> {
    Arc::new(DailyChallengeService::with_rng(
        store,
        db.clone(),
        common::test_clock(),
        StdRng::seed_from_u64(common::RNG_SEED),
    ))
}

#[tokio::test]
async fn test_batch_generates_for_every_user() {
    let db = Arc::new(MemoryDb::new());
    common::seed_exercise(&db, "plank", "Plank");
    for id in ["a", "b", "c"] {
        common::seed_user(&db, id);
    }

    let scheduler = ChallengeScheduler::new(
        challenge_service(db.clone(), &db),
        db.clone(),
        1000,
        common::test_clock(),
    );

    let report = scheduler.run_now().await.unwrap();
    assert_eq!(
        report,
        BatchReport {
            users: 3,
            succeeded: 3,
            failed: 0
        }
    );

    for id in ["a", "b", "c"] {
        assert!(db
            .find_challenge(id, common::test_today())
            .await
            .unwrap()
            .is_some());
    }

    // A second run finds the existing challenges.
    let report = scheduler.run_now().await.unwrap();
    assert_eq!(report.succeeded, 3);
    assert_eq!(db.challenges_for_user("a", None).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_batch_isolates_user_failures() {
    let db = Arc::new(MemoryDb::new());
    for id in ["bad-1", "good-1", "bad-2", "good-2"] {
        common::seed_user(&db, id);
    }

    let flaky: Arc<dyn ChallengeStore> = Arc::new(FlakyChallenges(db.clone()));
    let scheduler = ChallengeScheduler::new(
        challenge_service(flaky, &db),
        db.clone(),
        1000,
        common::test_clock(),
    );

    let report = scheduler.run_now().await.unwrap();
    assert_eq!(report.users, 4);
    assert_eq!(report.succeeded, 2);
    assert_eq!(report.failed, 2);
    assert!(!report.is_complete_success());

    assert!(db
        .find_challenge("good-2", common::test_today())
        .await
        .unwrap()
        .is_some());
    assert!(db
        .find_challenge("bad-1", common::test_today())
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_batch_size_caps_users() {
    let db = Arc::new(MemoryDb::new());
    for i in 0..5 {
        common::seed_user(&db, &format!("user-{}", i));
    }

    let scheduler = ChallengeScheduler::new(
        challenge_service(db.clone(), &db),
        db.clone(),
        2,
        common::test_clock(),
    );

    let report = scheduler.run_now().await.unwrap();
    assert_eq!(report.users, 2);
    assert_eq!(report.succeeded, 2);
}

#[tokio::test]
async fn test_list_failure_is_an_error() {
    let db = Arc::new(MemoryDb::new());
    let scheduler = ChallengeScheduler::new(
        challenge_service(db.clone(), &db),
        Arc::new(DownDirectory),
        1000,
        common::test_clock(),
    );

    assert!(scheduler.run_now().await.is_err());
}

#[tokio::test]
async fn test_start_stop_lifecycle() {
    let db = Arc::new(MemoryDb::new());
    let scheduler = ChallengeScheduler::new(
        challenge_service(db.clone(), &db),
        db.clone(),
        1000,
        common::test_clock(),
    );
    assert_eq!(scheduler.state(), SchedulerState::Idle);

    scheduler.start();
    assert!(matches!(scheduler.state(), SchedulerState::Waiting { .. }));

    // Starting again while armed is a no-op.
    scheduler.start();
    assert!(matches!(scheduler.state(), SchedulerState::Waiting { .. }));

    scheduler.stop();
    assert_eq!(scheduler.state(), SchedulerState::Stopped);
    scheduler.join().await;
    assert_eq!(scheduler.state(), SchedulerState::Stopped);

    // A stopped scheduler can be started again.
    scheduler.start();
    assert!(matches!(scheduler.state(), SchedulerState::Waiting { .. }));
    scheduler.stop();
    scheduler.join().await;
}

#[tokio::test]
async fn test_armed_for_next_local_midnight() {
    let db = Arc::new(MemoryDb::new());
    let scheduler = ChallengeScheduler::new(
        challenge_service(db.clone(), &db),
        db.clone(),
        1000,
        common::test_clock(),
    );

    scheduler.start();
    // Let the task compute its fire time.
    for _ in 0..100 {
        if let SchedulerState::Waiting { next_fire } = scheduler.state() {
            if next_fire.date_naive() != common::test_today() {
                break;
            }
        }
        tokio::task::yield_now().await;
    }

    match scheduler.state() {
        SchedulerState::Waiting { next_fire } => {
            let tomorrow = common::test_today().succ_opt().unwrap();
            assert_eq!(next_fire.date_naive(), tomorrow);
        }
        other => panic!("unexpected state {:?}", other),
    }

    scheduler.stop();
    scheduler.join().await;
}

#[tokio::test(start_paused = true)]
async fn test_timer_fires_batch_and_rearms() {
    let db = Arc::new(MemoryDb::new());
    common::seed_exercise(&db, "plank", "Plank");
    for id in ["a", "b"] {
        common::seed_user(&db, id);
    }

    let clock = common::test_clock();
    let scheduler = ChallengeScheduler::new(
        challenge_service(db.clone(), &db),
        db.clone(),
        1000,
        clock.clone(),
    );

    scheduler.start();
    // Let the task replace the placeholder with its real fire time.
    for _ in 0..100 {
        if let SchedulerState::Waiting { next_fire } = scheduler.state() {
            if next_fire.date_naive() != common::test_today() {
                break;
            }
        }
        tokio::task::yield_now().await;
    }
    let armed = match scheduler.state() {
        SchedulerState::Waiting { next_fire } => next_fire,
        other => panic!("unexpected state {:?}", other),
    };
    assert!(db
        .find_challenge("a", common::test_today())
        .await
        .unwrap()
        .is_none());

    // Noon on the fixed clock, so the timer is twelve hours out.
    let delay = duration_until_next_midnight(clock.now());
    tokio::time::advance(delay + Duration::from_secs(1)).await;

    let mut rearmed = false;
    for _ in 0..100 {
        tokio::task::yield_now().await;
        let generated = db
            .find_challenge("b", common::test_today())
            .await
            .unwrap()
            .is_some();
        if generated && matches!(scheduler.state(), SchedulerState::Waiting { .. }) {
            rearmed = true;
            break;
        }
    }
    assert!(rearmed, "batch did not run and re-arm");

    assert!(db
        .find_challenge("a", common::test_today())
        .await
        .unwrap()
        .is_some());
    assert_eq!(
        scheduler.state(),
        SchedulerState::Waiting { next_fire: armed }
    );

    scheduler.stop();
    scheduler.join().await;
    assert_eq!(scheduler.state(), SchedulerState::Stopped);
}
