// SPDX-FileCopyrightText: 2026 Standup Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the StorageAdapter trait.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use tokio::sync::OnceCell;
use tracing::{debug, info};

use standup_config::model::StorageConfig;
use standup_core::{
    AdapterType, DailyRecord, FollowupSession, HealthStatus, PendingRecord, PluginAdapter,
    StandupError, StorageAdapter, StoreStats,
};

use crate::database::Database;
use crate::queries;

/// SQLite-backed storage adapter.
///
/// The database is opened lazily by [`StorageAdapter::initialize`], which also
/// installs or removes the pending-update expiry trigger to match
/// `pending_expiry_hours`.
pub struct SqliteStorage {
    config: StorageConfig,
    db: OnceCell<Database>,
}

impl SqliteStorage {
    /// The connection is not opened until [`StorageAdapter::initialize`] is called.
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    fn db(&self) -> Result<&Database, StandupError> {
        self.db.get().ok_or_else(|| StandupError::Storage {
            source: "storage not initialized -- call initialize() first".into(),
        })
    }
}

#[async_trait]
impl PluginAdapter for SqliteStorage {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, StandupError> {
        self.db()?.ping().await?;
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), StandupError> {
        if let Some(db) = self.db.get() {
            db.checkpoint().await?;
            debug!("storage shut down");
        }
        Ok(())
    }
}

#[async_trait]
impl StorageAdapter for SqliteStorage {
    async fn initialize(&self) -> Result<(), StandupError> {
        let db = Database::open(&self.config.database_path, self.config.wal_mode).await?;
        queries::pending::configure_expiry(&db, self.config.pending_expiry_hours).await?;
        self.db.set(db).map_err(|_| StandupError::Storage {
            source: "storage already initialized".into(),
        })?;
        info!(
            path = %self.config.database_path,
            pending_expiry_hours = ?self.config.pending_expiry_hours,
            "SQLite storage initialized"
        );
        Ok(())
    }

    async fn close(&self) -> Result<(), StandupError> {
        self.db()?.checkpoint().await
    }

    // --- Pending updates ---

    async fn insert_pending(&self, record: &PendingRecord) -> Result<(), StandupError> {
        queries::pending::insert_pending(self.db()?, record).await
    }

    async fn get_pending(&self, id: &str) -> Result<Option<PendingRecord>, StandupError> {
        queries::pending::get_pending(self.db()?, id).await
    }

    async fn latest_unresolved_pending(
        &self,
        owner_id: &str,
    ) -> Result<Option<PendingRecord>, StandupError> {
        queries::pending::latest_unresolved_pending(self.db()?, owner_id).await
    }

    async fn list_pending(&self, owner_id: &str) -> Result<Vec<PendingRecord>, StandupError> {
        queries::pending::list_pending(self.db()?, owner_id).await
    }

    async fn delete_pending(&self, id: &str) -> Result<bool, StandupError> {
        queries::pending::delete_pending(self.db()?, id).await
    }

    async fn delete_pending_before(&self, cutoff: DateTime<Utc>) -> Result<u64, StandupError> {
        queries::pending::delete_pending_before(self.db()?, cutoff).await
    }

    async fn pending_expiry_active(&self) -> Result<bool, StandupError> {
        queries::pending::expiry_active(self.db()?).await
    }

    // --- Follow-up sessions ---

    async fn insert_session(&self, session: &FollowupSession) -> Result<(), StandupError> {
        queries::sessions::insert_session(self.db()?, session).await
    }

    async fn get_session(&self, id: &str) -> Result<Option<FollowupSession>, StandupError> {
        queries::sessions::get_session(self.db()?, id).await
    }

    async fn open_session_for_pending(
        &self,
        pending_id: &str,
    ) -> Result<Option<FollowupSession>, StandupError> {
        queries::sessions::open_session_for_pending(self.db()?, pending_id).await
    }

    async fn complete_session(
        &self,
        id: &str,
        answers: &[String],
        completed_at: DateTime<Utc>,
    ) -> Result<bool, StandupError> {
        queries::sessions::complete_session(self.db()?, id, answers, completed_at).await
    }

    async fn list_sessions(
        &self,
        owner_id: &str,
        limit: usize,
    ) -> Result<Vec<FollowupSession>, StandupError> {
        queries::sessions::list_sessions(self.db()?, owner_id, limit).await
    }

    async fn sessions_between(
        &self,
        owner_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<FollowupSession>, StandupError> {
        queries::sessions::sessions_between(self.db()?, owner_id, start, end).await
    }

    // --- Daily records ---

    async fn upsert_daily_record(&self, record: &DailyRecord) -> Result<String, StandupError> {
        queries::daily::upsert_daily_record(self.db()?, record).await
    }

    async fn get_daily_record(
        &self,
        owner_id: &str,
        date: NaiveDate,
    ) -> Result<Option<DailyRecord>, StandupError> {
        queries::daily::get_daily_record(self.db()?, owner_id, date).await
    }

    async fn daily_records_between(
        &self,
        owner_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailyRecord>, StandupError> {
        queries::daily::daily_records_between(self.db()?, owner_id, start, end).await
    }

    // --- Diagnostics ---

    async fn stats(&self) -> Result<StoreStats, StandupError> {
        let db = self.db()?;
        let (pending_updates, daily_records) = queries::daily::collection_counts(db).await?;
        let (sessions_pending, sessions_completed) =
            queries::sessions::count_by_status(db).await?;
        Ok(StoreStats {
            pending_updates,
            sessions_pending,
            sessions_completed,
            daily_records,
            expiry_active: queries::pending::expiry_active(db).await?,
        })
    }
}
