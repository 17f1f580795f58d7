// SPDX-FileCopyrightText: 2026 Standup Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Storage wrapper with injectable write failures.
//!
//! `FlakyStorage` delegates every call to an inner [`StorageAdapter`] and
//! can be told to fail the next N stale-record sweeps or daily-record
//! writes, so tests can drive partial-failure paths over a real store.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use standup_core::{
    AdapterType, DailyRecord, FollowupSession, HealthStatus, PendingRecord, PluginAdapter,
    StandupError, StorageAdapter, StoreStats,
};

pub struct FlakyStorage {
    inner: Arc<dyn StorageAdapter>,
    sweep_failures: AtomicUsize,
    daily_write_failures: AtomicUsize,
    sweep_calls: AtomicUsize,
}

impl FlakyStorage {
    pub fn new(inner: Arc<dyn StorageAdapter>) -> Self {
        Self {
            inner,
            sweep_failures: AtomicUsize::new(0),
            daily_write_failures: AtomicUsize::new(0),
            sweep_calls: AtomicUsize::new(0),
        }
    }

    /// Fail the next `n` calls to `delete_pending_before`.
    pub fn fail_next_sweeps(&self, n: usize) {
        self.sweep_failures.store(n, Ordering::SeqCst);
    }

    /// Fail the next `n` calls to `upsert_daily_record`.
    pub fn fail_next_daily_writes(&self, n: usize) {
        self.daily_write_failures.store(n, Ordering::SeqCst);
    }

    /// Sweeps attempted so far, failed ones included.
    pub fn sweep_calls(&self) -> usize {
        self.sweep_calls.load(Ordering::SeqCst)
    }
}

fn take_failure(counter: &AtomicUsize) -> bool {
    counter
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
        .is_ok()
}

fn injected(what: &str) -> StandupError {
    StandupError::Storage {
        source: format!("injected {what} failure").into(),
    }
}

#[async_trait]
impl PluginAdapter for FlakyStorage {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn version(&self) -> semver::Version {
        self.inner.version()
    }

    fn adapter_type(&self) -> AdapterType {
        self.inner.adapter_type()
    }

    async fn health_check(&self) -> Result<HealthStatus, StandupError> {
        self.inner.health_check().await
    }

    async fn shutdown(&self) -> Result<(), StandupError> {
        self.inner.shutdown().await
    }
}

#[async_trait]
impl StorageAdapter for FlakyStorage {
    async fn initialize(&self) -> Result<(), StandupError> {
        self.inner.initialize().await
    }

    async fn close(&self) -> Result<(), StandupError> {
        self.inner.close().await
    }

    async fn insert_pending(&self, record: &PendingRecord) -> Result<(), StandupError> {
        self.inner.insert_pending(record).await
    }

    async fn get_pending(&self, id: &str) -> Result<Option<PendingRecord>, StandupError> {
        self.inner.get_pending(id).await
    }

    async fn latest_unresolved_pending(
        &self,
        owner_id: &str,
    ) -> Result<Option<PendingRecord>, StandupError> {
        self.inner.latest_unresolved_pending(owner_id).await
    }

    async fn list_pending(&self, owner_id: &str) -> Result<Vec<PendingRecord>, StandupError> {
        self.inner.list_pending(owner_id).await
    }

    async fn delete_pending(&self, id: &str) -> Result<bool, StandupError> {
        self.inner.delete_pending(id).await
    }

    async fn delete_pending_before(&self, cutoff: DateTime<Utc>) -> Result<u64, StandupError> {
        self.sweep_calls.fetch_add(1, Ordering::SeqCst);
        if take_failure(&self.sweep_failures) {
            return Err(injected("sweep"));
        }
        self.inner.delete_pending_before(cutoff).await
    }

    async fn pending_expiry_active(&self) -> Result<bool, StandupError> {
        self.inner.pending_expiry_active().await
    }

    async fn insert_session(&self, session: &FollowupSession) -> Result<(), StandupError> {
        self.inner.insert_session(session).await
    }

    async fn get_session(&self, id: &str) -> Result<Option<FollowupSession>, StandupError> {
        self.inner.get_session(id).await
    }

    async fn open_session_for_pending(
        &self,
        pending_id: &str,
    ) -> Result<Option<FollowupSession>, StandupError> {
        self.inner.open_session_for_pending(pending_id).await
    }

    async fn complete_session(
        &self,
        id: &str,
        answers: &[String],
        completed_at: DateTime<Utc>,
    ) -> Result<bool, StandupError> {
        self.inner.complete_session(id, answers, completed_at).await
    }

    async fn list_sessions(
        &self,
        owner_id: &str,
        limit: usize,
    ) -> Result<Vec<FollowupSession>, StandupError> {
        self.inner.list_sessions(owner_id, limit).await
    }

    async fn sessions_between(
        &self,
        owner_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<FollowupSession>, StandupError> {
        self.inner.sessions_between(owner_id, start, end).await
    }

    async fn upsert_daily_record(&self, record: &DailyRecord) -> Result<String, StandupError> {
        if take_failure(&self.daily_write_failures) {
            return Err(injected("daily record write"));
        }
        self.inner.upsert_daily_record(record).await
    }

    async fn get_daily_record(
        &self,
        owner_id: &str,
        date: NaiveDate,
    ) -> Result<Option<DailyRecord>, StandupError> {
        self.inner.get_daily_record(owner_id, date).await
    }

    async fn daily_records_between(
        &self,
        owner_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailyRecord>, StandupError> {
        self.inner.daily_records_between(owner_id, start, end).await
    }

    async fn stats(&self) -> Result<StoreStats, StandupError> {
        self.inner.stats().await
    }
}
