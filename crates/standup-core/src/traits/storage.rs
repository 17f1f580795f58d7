// SPDX-FileCopyrightText: 2026 Standup Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Storage adapter trait for the three logical collections of the service:
//! pending updates, follow-up sessions and finalized daily records.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

use crate::error::StandupError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{DailyRecord, FollowupSession, PendingRecord, StoreStats};

/// Adapter for the document store backing the follow-up engine.
#[async_trait]
pub trait StorageAdapter: PluginAdapter {
    /// Initializes the storage backend (migrations, connection, expiry trigger).
    async fn initialize(&self) -> Result<(), StandupError>;

    /// Closes the storage backend, flushing pending writes.
    async fn close(&self) -> Result<(), StandupError>;

    // --- Pending updates ---

    /// Stages a pending record.
    async fn insert_pending(&self, record: &PendingRecord) -> Result<(), StandupError>;

    /// Gets a pending record by ID.
    async fn get_pending(&self, id: &str) -> Result<Option<PendingRecord>, StandupError>;

    /// Most recently submitted pending record for the owner whose follow-up
    /// has not finished.
    async fn latest_unresolved_pending(
        &self,
        owner_id: &str,
    ) -> Result<Option<PendingRecord>, StandupError>;

    /// All pending records for the owner, newest first.
    async fn list_pending(&self, owner_id: &str) -> Result<Vec<PendingRecord>, StandupError>;

    /// Deletes one pending record. Returns whether a row was removed.
    async fn delete_pending(&self, id: &str) -> Result<bool, StandupError>;

    /// Deletes every pending record submitted before `cutoff`, whatever its
    /// completion flag. Returns the number of rows removed.
    async fn delete_pending_before(&self, cutoff: DateTime<Utc>) -> Result<u64, StandupError>;

    /// Whether the store's own expiry mechanism for pending records is installed.
    async fn pending_expiry_active(&self) -> Result<bool, StandupError>;

    // --- Follow-up sessions ---

    /// Persists a newly opened session.
    async fn insert_session(&self, session: &FollowupSession) -> Result<(), StandupError>;

    /// Gets a session by ID.
    async fn get_session(&self, id: &str) -> Result<Option<FollowupSession>, StandupError>;

    /// The still-pending session opened for a pending record, if any.
    async fn open_session_for_pending(
        &self,
        pending_id: &str,
    ) -> Result<Option<FollowupSession>, StandupError>;

    /// Stores answers, marks the session completed. Returns whether the session existed.
    async fn complete_session(
        &self,
        id: &str,
        answers: &[String],
        completed_at: DateTime<Utc>,
    ) -> Result<bool, StandupError>;

    /// The owner's sessions, newest first.
    async fn list_sessions(
        &self,
        owner_id: &str,
        limit: usize,
    ) -> Result<Vec<FollowupSession>, StandupError>;

    /// The owner's sessions created within `[start, end]`, oldest first.
    async fn sessions_between(
        &self,
        owner_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<FollowupSession>, StandupError>;

    // --- Daily records ---

    /// Writes the record for `(owner_id, date)`, replacing any existing one.
    /// Returns the ID of the stored record (the existing ID on replace).
    async fn upsert_daily_record(&self, record: &DailyRecord) -> Result<String, StandupError>;

    /// Gets the record for an owner and day.
    async fn get_daily_record(
        &self,
        owner_id: &str,
        date: NaiveDate,
    ) -> Result<Option<DailyRecord>, StandupError>;

    /// The owner's records dated within `[start, end]`, oldest first.
    async fn daily_records_between(
        &self,
        owner_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailyRecord>, StandupError>;

    // --- Diagnostics ---

    /// Per-collection counts.
    async fn stats(&self) -> Result<StoreStats, StandupError>;
}
