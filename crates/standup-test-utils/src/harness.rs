// SPDX-FileCopyrightText: 2026 Standup Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end integration testing.
//!
//! `TestHarness` wires the orchestrator, reconciler and report synthesizer
//! over a temp SQLite database and a [`MockProvider`].

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, Utc};
use standup_config::StandupConfig;
use standup_config::model::{ScoringConfig, StorageConfig};
use standup_core::{
    PendingRecord, PluginAdapter, ProviderAdapter, StandupError, StorageAdapter, Submission,
    WorkStatus,
};
use standup_followup::{
    FollowupOrchestrator, QualityScorer, QuestionGenerator, Reconciler, ReportSynthesizer,
};
use standup_storage::SqliteStorage;

use crate::flaky_storage::FlakyStorage;
use crate::mock_provider::MockProvider;

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    responses: Vec<String>,
    provider: Option<MockProvider>,
    expiry_hours: Option<u32>,
    scoring: Option<ScoringConfig>,
    generation_timeout: Option<Duration>,
    reconciler_interval_secs: Option<u64>,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            responses: Vec::new(),
            provider: None,
            expiry_hours: None,
            scoring: None,
            generation_timeout: None,
            reconciler_interval_secs: None,
        }
    }

    /// Queue replies on the mock provider.
    pub fn with_mock_responses(mut self, responses: Vec<String>) -> Self {
        self.responses = responses;
        self
    }

    /// Use a preconfigured mock provider (latency, probe status).
    pub fn with_provider(mut self, provider: MockProvider) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Install the store-level expiry trigger. Off by default so tests can
    /// stage back-dated pending records.
    pub fn with_expiry_hours(mut self, hours: u32) -> Self {
        self.expiry_hours = Some(hours);
        self
    }

    pub fn with_scoring(mut self, scoring: ScoringConfig) -> Self {
        self.scoring = Some(scoring);
        self
    }

    /// Bound on question generation calls.
    pub fn with_generation_timeout(mut self, timeout: Duration) -> Self {
        self.generation_timeout = Some(timeout);
        self
    }

    /// Period of the spawned reconciler loop.
    pub fn with_reconciler_interval(mut self, secs: u64) -> Self {
        self.reconciler_interval_secs = Some(secs);
        self
    }

    /// Build the test harness, creating all required subsystems.
    pub async fn build(self) -> Result<TestHarness, StandupError> {
        let temp_dir =
            tempfile::TempDir::new().map_err(|e| StandupError::Storage { source: e.into() })?;
        let db_path = temp_dir.path().join("test.db");

        let mut config = StandupConfig::default();
        config.storage = StorageConfig {
            database_path: db_path.to_string_lossy().to_string(),
            wal_mode: true,
            pending_expiry_hours: self.expiry_hours,
        };
        if let Some(scoring) = self.scoring {
            config.scoring = scoring;
        }
        if let Some(secs) = self.reconciler_interval_secs {
            config.reconciler.interval_secs = secs;
        }

        let storage = Arc::new(SqliteStorage::new(config.storage.clone()));
        storage.initialize().await?;
        let faults = Arc::new(FlakyStorage::new(storage.clone()));
        let store: Arc<dyn StorageAdapter> = faults.clone();

        let provider = self.provider.unwrap_or_default();
        for text in self.responses {
            provider.push_response(text);
        }
        let provider = Arc::new(provider);
        let dyn_provider: Arc<dyn ProviderAdapter> = provider.clone();

        let mut generator = QuestionGenerator::new(dyn_provider.clone(), config.lmstudio.clone());
        if let Some(timeout) = self.generation_timeout {
            generator = generator.with_timeout(timeout);
        }
        let orchestrator = Arc::new(FollowupOrchestrator::new(
            store.clone(),
            QualityScorer::new(config.scoring.clone()),
            generator,
            config.followup.clone(),
        ));
        let synthesizer = Arc::new(ReportSynthesizer::new(
            store.clone(),
            dyn_provider,
            config.lmstudio.clone(),
            config.report.clone(),
        ));
        let reconciler = Arc::new(Reconciler::new(store, config.reconciler.clone()));

        Ok(TestHarness {
            storage,
            faults,
            provider,
            orchestrator,
            synthesizer,
            reconciler,
            config,
            _temp_dir: temp_dir,
        })
    }
}

/// A complete follow-up stack over a temp database.
pub struct TestHarness {
    pub storage: Arc<SqliteStorage>,
    /// The store as seen by the engine; failures injected here hit the
    /// orchestrator, synthesizer and reconciler but not direct `storage` calls.
    pub faults: Arc<FlakyStorage>,
    pub provider: Arc<MockProvider>,
    pub orchestrator: Arc<FollowupOrchestrator>,
    pub synthesizer: Arc<ReportSynthesizer>,
    pub reconciler: Arc<Reconciler>,
    pub config: StandupConfig,
    _temp_dir: tempfile::TempDir,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// Default harness: empty script, no store-level expiry.
    pub async fn new() -> Result<Self, StandupError> {
        Self::builder().build().await
    }

    pub fn storage_adapter(&self) -> Arc<dyn StorageAdapter> {
        self.storage.clone()
    }

    pub fn provider_adapter(&self) -> Arc<dyn ProviderAdapter> {
        self.provider.clone()
    }
}

/// A `working` submission for today.
pub fn submission(owner_id: &str, task: &str) -> Submission {
    Submission {
        owner_id: owner_id.to_string(),
        status: WorkStatus::Working,
        stack: "fullstack".to_string(),
        task: Some(task.to_string()),
        progress: None,
        blockers: None,
        date: Utc::now().date_naive(),
    }
}

/// A staged record submitted at `submitted_at`, for seeding the store directly.
pub fn pending_record(
    owner_id: &str,
    task: &str,
    date: NaiveDate,
    submitted_at: DateTime<Utc>,
) -> PendingRecord {
    PendingRecord {
        id: uuid::Uuid::new_v4().to_string(),
        owner_id: owner_id.to_string(),
        date,
        stack: "fullstack".to_string(),
        task: task.to_string(),
        progress: String::new(),
        blockers: String::new(),
        status: WorkStatus::Working,
        quality_score: 3.0,
        breakdown: None,
        submitted_at,
        followup_completed: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn harness_builds_with_empty_store() {
        let harness = TestHarness::new().await.unwrap();
        let stats = harness.storage.stats().await.unwrap();
        assert_eq!(stats.pending_updates, 0);
        assert!(!stats.expiry_active);
    }

    #[tokio::test]
    async fn expiry_can_be_enabled() {
        let harness = TestHarness::builder().with_expiry_hours(24).build().await.unwrap();
        assert!(harness.storage.pending_expiry_active().await.unwrap());
    }
}
