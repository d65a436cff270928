// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Midnight generation of daily challenges.
//!
//! The scheduler owns a background task that sleeps until the next local
//! midnight, generates today's challenge for a batch of users, and re-arms.
//! Users missed by the batch still get a challenge lazily on first request.

use crate::db::UserDirectory;
use crate::error::Result;
use crate::services::DailyChallengeService;
use crate::time_utils::{duration_until_next_midnight, format_utc_rfc3339, Clock};
use chrono::{DateTime, Local, Utc};
use futures_util::stream::{self, StreamExt};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Users processed concurrently within one batch.
const GENERATION_CONCURRENCY: usize = 10;

/// Lifecycle of a [`ChallengeScheduler`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    /// Never started.
    Idle,
    /// Armed, sleeping until `next_fire`.
    Waiting { next_fire: DateTime<Local> },
    /// Generating a batch.
    Firing,
    /// Stopped explicitly. May be started again.
    Stopped,
}

impl SchedulerState {
    fn is_running(&self) -> bool {
        matches!(self, Self::Waiting { .. } | Self::Firing)
    }
}

/// Outcome of one generation batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchReport {
    /// Users listed for this batch.
    pub users: u32,
    /// Users whose challenge was generated or already existed.
    pub succeeded: u32,
    /// Users whose generation failed.
    pub failed: u32,
}

impl BatchReport {
    pub fn is_complete_success(&self) -> bool {
        self.failed == 0
    }
}

struct Shared {
    challenges: Arc<DailyChallengeService>,
    users: Arc<dyn UserDirectory>,
    batch_size: u32,
    clock: Arc<dyn Clock>,
    state: Mutex<SchedulerState>,
}

impl Shared {
    fn state(&self) -> MutexGuard<'_, SchedulerState> {
        // State is plain data; a poisoned lock still holds a valid value.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    async fn run_batch(&self) -> Result<BatchReport> {
        let users = self.users.list_users(self.batch_size).await?;
        let mut report = BatchReport {
            users: users.len() as u32,
            ..Default::default()
        };

        let outcomes: Vec<bool> = stream::iter(users)
            .map(|user| async move {
                match self.challenges.generate_daily_challenge(&user.id).await {
                    Ok(_) => true,
                    Err(e) => {
                        tracing::error!(
                            user_id = %user.id,
                            error = %e,
                            "Failed to generate daily challenge"
                        );
                        false
                    }
                }
            })
            .buffer_unordered(GENERATION_CONCURRENCY)
            .collect()
            .await;

        for ok in outcomes {
            if ok {
                report.succeeded += 1;
            } else {
                report.failed += 1;
            }
        }

        tracing::info!(
            users = report.users,
            succeeded = report.succeeded,
            failed = report.failed,
            "Daily challenge batch finished"
        );

        Ok(report)
    }

    async fn run(self: Arc<Self>, mut stop_rx: watch::Receiver<bool>) {
        loop {
            let now = self.clock.now();
            let delay = duration_until_next_midnight(now);
            let next_fire = chrono::Duration::from_std(delay)
                .ok()
                .and_then(|d| now.checked_add_signed(d))
                .unwrap_or(now);

            {
                let mut state = self.state();
                if *stop_rx.borrow() || *state == SchedulerState::Stopped {
                    break;
                }
                *state = SchedulerState::Waiting { next_fire };
            }

            tracing::info!(
                delay_secs = delay.as_secs(),
                next_fire = %format_utc_rfc3339(next_fire.with_timezone(&Utc)),
                "Daily challenge generation armed"
            );

            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = stop_rx.changed() => {
                    tracing::debug!("Challenge scheduler received stop signal");
                    break;
                }
            }

            {
                let mut state = self.state();
                if *state == SchedulerState::Stopped {
                    break;
                }
                *state = SchedulerState::Firing;
            }
            if let Err(e) = self.run_batch().await {
                tracing::error!(error = %e, "Failed to list users for daily challenge batch");
            }
        }
    }
}

/// Owns the midnight generation task.
pub struct ChallengeScheduler {
    shared: Arc<Shared>,
    stop_tx: Mutex<Option<watch::Sender<bool>>>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl ChallengeScheduler {
    pub fn new(
        challenges: Arc<DailyChallengeService>,
        users: Arc<dyn UserDirectory>,
        batch_size: u32,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                challenges,
                users,
                batch_size,
                clock,
                state: Mutex::new(SchedulerState::Idle),
            }),
            stop_tx: Mutex::new(None),
            handle: Mutex::new(None),
        }
    }

    pub fn state(&self) -> SchedulerState {
        *self.shared.state()
    }

    /// Spawn the background task. Must be called within a tokio runtime.
    pub fn start(&self) {
        let (stop_tx, stop_rx) = watch::channel(false);
        {
            let mut state = self.shared.state();
            if state.is_running() {
                tracing::warn!("Challenge scheduler already running");
                return;
            }
            // Placeholder until the task computes the real fire time.
            *state = SchedulerState::Waiting {
                next_fire: self.shared.clock.now(),
            };
        }

        tracing::info!(
            batch_size = self.shared.batch_size,
            "Starting challenge scheduler"
        );

        let handle = tokio::spawn(Arc::clone(&self.shared).run(stop_rx));
        *self.stop_tx.lock().unwrap_or_else(|e| e.into_inner()) = Some(stop_tx);
        *self.handle.lock().unwrap_or_else(|e| e.into_inner()) = Some(handle);
    }

    /// Cancel the armed timer. A batch already in progress runs to the end.
    pub fn stop(&self) {
        *self.shared.state() = SchedulerState::Stopped;
        if let Some(stop_tx) = self.stop_tx.lock().unwrap_or_else(|e| e.into_inner()).take() {
            let _ = stop_tx.send(true);
        }
        tracing::info!("Challenge scheduler stopped");
    }

    /// Wait for the background task to exit after [`stop`](Self::stop).
    pub async fn join(&self) {
        let handle = self.handle.lock().unwrap_or_else(|e| e.into_inner()).take();
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                tracing::error!(error = %e, "Challenge scheduler task panicked");
            }
        }
    }

    /// Generate today's challenges for one batch immediately.
    pub async fn run_now(&self) -> Result<BatchReport> {
        self.shared.run_batch().await
    }
}

impl Drop for ChallengeScheduler {
    fn drop(&mut self) {
        if let Some(stop_tx) = self.stop_tx.get_mut().ok().and_then(Option::take) {
            let _ = stop_tx.send(true);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_running_states() {
        assert!(!SchedulerState::Idle.is_running());
        assert!(!SchedulerState::Stopped.is_running());
        assert!(SchedulerState::Firing.is_running());
        assert!(SchedulerState::Waiting {
            next_fire: Local::now()
        }
        .is_running());
    }

    #[test]
    fn test_report_success() {
        let report = BatchReport {
            users: 3,
            succeeded: 3,
            failed: 0,
        };
        assert!(report.is_complete_success());

        let report = BatchReport {
            users: 3,
            succeeded: 2,
            failed: 1,
        };
        assert!(!report.is_complete_success());
    }
}
