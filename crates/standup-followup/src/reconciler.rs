// SPDX-FileCopyrightText: 2026 Standup Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Periodic sweep of stale pending records.
//!
//! Abandoned follow-ups, crashed sessions and failed completions all leave
//! pending records behind; this is what removes them. A sweep deletes every
//! pending record older than the horizon, whatever its completion flag.
//! Sweep failures are logged and the schedule carries on.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use standup_config::model::ReconcilerConfig;
use standup_core::{StandupError, StorageAdapter};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Outcome of one sweep.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SweepReport {
    pub horizon_hours: u32,
    pub expiry_active: bool,
    pub cutoff: DateTime<Utc>,
    pub deleted: u64,
}

pub struct Reconciler {
    storage: Arc<dyn StorageAdapter>,
    config: ReconcilerConfig,
}

impl Reconciler {
    pub fn new(storage: Arc<dyn StorageAdapter>, config: ReconcilerConfig) -> Self {
        Self { storage, config }
    }

    /// Horizon to sweep with, given whether the store expires pending records itself.
    pub fn horizon_hours(&self, expiry_active: bool) -> u32 {
        if expiry_active {
            self.config.horizon_hours_with_expiry
        } else {
            self.config.horizon_hours
        }
    }

    /// Runs a single sweep as of `now`.
    pub async fn run_once(&self, now: DateTime<Utc>) -> Result<SweepReport, StandupError> {
        let expiry_active = match self.storage.pending_expiry_active().await {
            Ok(active) => active,
            Err(e) => {
                warn!(error = %e, "could not probe store expiry; assuming inactive");
                false
            }
        };
        let horizon_hours = self.horizon_hours(expiry_active);
        let cutoff = now - chrono::Duration::hours(i64::from(horizon_hours));
        let deleted = self.storage.delete_pending_before(cutoff).await?;

        Ok(SweepReport {
            horizon_hours,
            expiry_active,
            cutoff,
            deleted,
        })
    }

    /// Starts the recurring sweep. The first sweep runs immediately.
    ///
    /// The task stops when `cancel` fires or the returned handle is shut down
    /// or dropped. A sweep in progress finishes before the task exits.
    pub fn spawn(self: Arc<Self>, cancel: CancellationToken) -> ReconcilerHandle {
        let interval_secs = self.config.interval_secs;
        let task_cancel = cancel.clone();

        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        match self.run_once(Utc::now()).await {
                            Ok(report) if report.deleted > 0 => {
                                info!(
                                    deleted = report.deleted,
                                    horizon_hours = report.horizon_hours,
                                    expiry_active = report.expiry_active,
                                    "removed stale pending records"
                                );
                            }
                            Ok(report) => {
                                debug!(horizon_hours = report.horizon_hours, "no stale pending records");
                            }
                            Err(e) => {
                                error!(error = %e, "pending record sweep failed (will retry next interval)");
                            }
                        }
                    }
                    _ = task_cancel.cancelled() => {
                        info!("reconciler shutting down");
                        break;
                    }
                }
            }
        });

        ReconcilerHandle {
            cancel,
            task: Some(task),
        }
    }
}

/// Owned handle to the running sweep task. Dropping it cancels the task.
pub struct ReconcilerHandle {
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl ReconcilerHandle {
    pub fn is_finished(&self) -> bool {
        self.task.as_ref().is_none_or(JoinHandle::is_finished)
    }

    /// Cancels the task and waits for it to exit.
    pub async fn shutdown(mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                error!(error = %e, "reconciler task ended abnormally");
            }
        }
    }
}

impl Drop for ReconcilerHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
