// SPDX-FileCopyrightText: 2026 Standup Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `standup serve` implementation.
//!
//! Opens the store, wires the provider into the follow-up engine, starts the
//! reconciler and serves HTTP until a shutdown signal arrives.

use std::sync::Arc;
use std::time::Instant;

use standup_config::StandupConfig;
use standup_core::{PluginAdapter, ProviderAdapter, StandupError, StorageAdapter};
use standup_followup::{
    FollowupOrchestrator, QualityScorer, QuestionGenerator, Reconciler, ReportSynthesizer,
};
use standup_gateway::{GatewayState, ServerConfig};
use standup_lmstudio::LmStudioProvider;
use standup_storage::SqliteStorage;
use tracing::{info, warn};

use crate::shutdown;

/// Runs the service until SIGINT/SIGTERM.
pub async fn run_serve(config: StandupConfig) -> Result<(), StandupError> {
    init_tracing(&config.service.log_level);

    info!(name = %config.service.name, "starting standup serve");

    let storage = open_storage(&config).await?;
    let provider: Arc<dyn ProviderAdapter> = Arc::new(LmStudioProvider::new(&config.lmstudio)?);

    let orchestrator = Arc::new(build_orchestrator(&config, storage.clone(), provider.clone()));
    let synthesizer = Arc::new(ReportSynthesizer::new(
        storage.clone(),
        provider.clone(),
        config.lmstudio.clone(),
        config.report.clone(),
    ));

    let cancel = shutdown::install_signal_handler();

    let reconciler = Arc::new(Reconciler::new(storage.clone(), config.reconciler.clone()))
        .spawn(cancel.child_token());

    let state = GatewayState {
        orchestrator,
        synthesizer,
        provider: provider.clone(),
        storage: storage.clone(),
        service_name: config.service.name.clone(),
        start_time: Instant::now(),
    };
    let server_config = ServerConfig {
        host: config.gateway.host.clone(),
        port: config.gateway.port,
    };

    let served = standup_gateway::start_server(&server_config, state, cancel.clone()).await;

    // The server may also return on a bind or accept error.
    cancel.cancel();
    reconciler.shutdown().await;

    if let Err(e) = provider.shutdown().await {
        warn!(error = %e, "provider shutdown failed");
    }
    if let Err(e) = storage.close().await {
        warn!(error = %e, "store checkpoint on shutdown failed");
    }

    info!("standup stopped");
    served
}

/// Opens and initializes the SQLite store.
pub(crate) async fn open_storage(
    config: &StandupConfig,
) -> Result<Arc<dyn StorageAdapter>, StandupError> {
    let storage = SqliteStorage::new(config.storage.clone());
    storage.initialize().await?;
    Ok(Arc::new(storage))
}

pub(crate) fn build_orchestrator(
    config: &StandupConfig,
    storage: Arc<dyn StorageAdapter>,
    provider: Arc<dyn ProviderAdapter>,
) -> FollowupOrchestrator {
    FollowupOrchestrator::new(
        storage,
        QualityScorer::new(config.scoring.clone()),
        QuestionGenerator::new(provider, config.lmstudio.clone()),
        config.followup.clone(),
    )
}

/// Initialize the tracing subscriber with an environment filter.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("standup={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
