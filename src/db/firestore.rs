// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - Users and exercises (read-only directories)
//! - Activities (dated exercise completions)
//! - Streak badges (one per user and milestone)
//! - Daily challenges (one per user and day)
//!
//! Uniqueness rests on deterministic document IDs plus create-only inserts:
//! Firestore rejects a create for an existing document, which we report as
//! `Ok(false)`.

use crate::db::collections;
use crate::db::store::{ActivityLog, BadgeStore, ChallengeStore, ExerciseCatalog, UserDirectory};
use crate::error::AppError;
use crate::models::{ActivityRecord, DailyChallenge, Exercise, StreakBadge, User};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use firestore::errors::{BackoffError, FirestoreError};
use firestore::{FirestoreQueryDirection, FirestoreTransaction};

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        // The emulator accepts unauthenticated connections; skip credential lookup.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a mock Firestore client for testing (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    /// Helper to get the client or return an error if offline.
    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.client
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }

    /// Create-only insert. `Ok(false)` if the document already exists.
    async fn insert_unique<T>(&self, collection: &str, doc_id: &str, object: &T) -> Result<bool, AppError>
    where
        T: serde::Serialize + serde::de::DeserializeOwned + Send + Sync,
    {
        let result: Result<T, FirestoreError> = self
            .get_client()?
            .fluent()
            .insert()
            .into(collection)
            .document_id(doc_id)
            .object(object)
            .execute()
            .await;

        match result {
            Ok(_) => Ok(true),
            Err(FirestoreError::DataConflictError(_)) => {
                tracing::debug!(collection, doc_id, "Document already exists");
                Ok(false)
            }
            Err(e) => Err(AppError::Database(e.to_string())),
        }
    }

    /// Read-modify-write of one incomplete challenge.
    ///
    /// The read is bound to the transaction, so Firestore detects a
    /// concurrent write to the same document and `run_transaction` retries
    /// with a fresh read. A completed challenge is returned unchanged.
    async fn update_challenge_in_transaction<F>(
        &self,
        doc_id: &str,
        update: F,
    ) -> Result<Option<DailyChallenge>, AppError>
    where
        F: Fn(&mut DailyChallenge) + Clone + Send + Sync + 'static,
    {
        self.get_client()?
            .run_transaction(|db, transaction| {
                let doc_id = doc_id.to_string();
                let update = update.clone();
                Box::pin(async move {
                    update_challenge_doc(&db, transaction, &doc_id, &update).await
                })
            })
            .await
            .map_err(|e| AppError::Database(format!("Challenge transaction failed: {}", e)))
    }

    // ─── Catalog Seeding ─────────────────────────────────────────

    /// Create or replace a catalog exercise.
    pub async fn upsert_exercise(&self, exercise: &Exercise) -> Result<(), AppError> {
        let _: Exercise = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::EXERCISES)
            .document_id(&exercise.id)
            .object(exercise)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Create or replace a user profile.
    pub async fn upsert_user(&self, user: &User) -> Result<(), AppError> {
        let _: User = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::USERS)
            .document_id(&user.id)
            .object(user)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }
}

/// Transaction body for [`FirestoreDb::update_challenge_in_transaction`].
///
/// `db` carries the transaction's consistency selector, so the read below
/// happens inside the transaction.
async fn update_challenge_doc<F>(
    db: &firestore::FirestoreDb,
    transaction: &mut FirestoreTransaction<'_>,
    doc_id: &str,
    update: &F,
) -> Result<Option<DailyChallenge>, BackoffError<FirestoreError>>
where
    F: Fn(&mut DailyChallenge),
{
    let current: Option<DailyChallenge> = db
        .fluent()
        .select()
        .by_id_in(collections::DAILY_CHALLENGES)
        .obj()
        .one(doc_id)
        .await
        .map_err(transaction_error)?;

    let Some(mut challenge) = current else {
        return Ok(None);
    };

    if challenge.is_completed {
        return Ok(Some(challenge));
    }

    update(&mut challenge);

    db.fluent()
        .update()
        .in_col(collections::DAILY_CHALLENGES)
        .document_id(doc_id)
        .object(&challenge)
        .add_to_transaction(transaction)
        .map_err(transaction_error)?;

    Ok(Some(challenge))
}

/// Retry only what Firestore reports as retryable, such as contention.
fn transaction_error(err: FirestoreError) -> BackoffError<FirestoreError> {
    match &err {
        FirestoreError::DatabaseError(db_err) if db_err.retry_possible => {
            BackoffError::transient(err)
        }
        _ => BackoffError::permanent(err),
    }
}

// ─── User Operations ─────────────────────────────────────────

#[async_trait]
impl UserDirectory for FirestoreDb {
    async fn list_users(&self, limit: u32) -> Result<Vec<User>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .from(collections::USERS)
            .limit(limit)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn get_user(&self, user_id: &str) -> Result<Option<User>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::USERS)
            .obj()
            .one(user_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

// ─── Activity Operations ─────────────────────────────────────

#[async_trait]
impl ActivityLog for FirestoreDb {
    async fn activities_for_user(&self, user_id: &str) -> Result<Vec<ActivityRecord>, AppError> {
        let user_id = user_id.to_string();
        self.get_client()?
            .fluent()
            .select()
            .from(collections::ACTIVITIES)
            .filter(move |q| q.field("userId").eq(user_id.clone()))
            .order_by([("date", FirestoreQueryDirection::Descending)])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn insert_activity(&self, record: &ActivityRecord) -> Result<bool, AppError> {
        self.insert_unique(collections::ACTIVITIES, &record.document_id(), record)
            .await
    }
}

// ─── Exercise Catalog ────────────────────────────────────────

#[async_trait]
impl ExerciseCatalog for FirestoreDb {
    async fn list_exercises(&self) -> Result<Vec<Exercise>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .from(collections::EXERCISES)
            .order_by([("name", FirestoreQueryDirection::Ascending)])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn count_exercises(&self) -> Result<u64, AppError> {
        // The catalog is small and seeded once; a full read is cheap enough.
        Ok(self.list_exercises().await?.len() as u64)
    }

    async fn exercise_at(&self, offset: u64) -> Result<Option<Exercise>, AppError> {
        let offset = u32::try_from(offset)
            .map_err(|_| AppError::BadRequest(format!("Offset {} out of range", offset)))?;

        let exercises: Vec<Exercise> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::EXERCISES)
            .order_by([("name", FirestoreQueryDirection::Ascending)])
            .offset(offset)
            .limit(1)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(exercises.into_iter().next())
    }

    async fn get_exercise(&self, exercise_id: &str) -> Result<Option<Exercise>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::EXERCISES)
            .obj()
            .one(exercise_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

// ─── Streak Badge Operations ─────────────────────────────────

#[async_trait]
impl BadgeStore for FirestoreDb {
    async fn find_badge(
        &self,
        user_id: &str,
        milestone: u32,
    ) -> Result<Option<StreakBadge>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::STREAK_BADGES)
            .obj()
            .one(&StreakBadge::document_id(user_id, milestone))
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn insert_badge(&self, badge: &StreakBadge) -> Result<bool, AppError> {
        self.insert_unique(collections::STREAK_BADGES, &badge.id, badge)
            .await
    }

    async fn badges_for_user(&self, user_id: &str) -> Result<Vec<StreakBadge>, AppError> {
        let user_id = user_id.to_string();
        self.get_client()?
            .fluent()
            .select()
            .from(collections::STREAK_BADGES)
            .filter(move |q| q.field("userId").eq(user_id.clone()))
            .order_by([("milestone", FirestoreQueryDirection::Ascending)])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

// ─── Daily Challenge Operations ──────────────────────────────

#[async_trait]
impl ChallengeStore for FirestoreDb {
    async fn find_challenge(
        &self,
        user_id: &str,
        date: NaiveDate,
    ) -> Result<Option<DailyChallenge>, AppError> {
        self.get_challenge(&DailyChallenge::document_id(user_id, date))
            .await
    }

    async fn get_challenge(&self, challenge_id: &str) -> Result<Option<DailyChallenge>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::DAILY_CHALLENGES)
            .obj()
            .one(challenge_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn insert_challenge(&self, challenge: &DailyChallenge) -> Result<bool, AppError> {
        self.insert_unique(collections::DAILY_CHALLENGES, &challenge.id, challenge)
            .await
    }

    async fn apply_progress(
        &self,
        user_id: &str,
        date: NaiveDate,
        increment: u32,
        now: DateTime<Utc>,
    ) -> Result<Option<DailyChallenge>, AppError> {
        let doc_id = DailyChallenge::document_id(user_id, date);
        self.update_challenge_in_transaction(&doc_id, move |challenge| {
            challenge.apply_progress(increment, now);
        })
        .await
    }

    async fn complete_challenge(
        &self,
        challenge_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<DailyChallenge>, AppError> {
        self.update_challenge_in_transaction(challenge_id, move |challenge| {
            challenge.mark_complete(now);
        })
        .await
    }

    async fn challenges_for_user(
        &self,
        user_id: &str,
        limit: Option<u32>,
    ) -> Result<Vec<DailyChallenge>, AppError> {
        let user_id = user_id.to_string();
        let query = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::DAILY_CHALLENGES)
            .filter(move |q| q.field("userId").eq(user_id.clone()))
            .order_by([("date", FirestoreQueryDirection::Descending)]);

        let query = match limit {
            Some(limit) => query.limit(limit),
            None => query,
        };

        query
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
