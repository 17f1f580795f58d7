// SPDX-FileCopyrightText: 2026 Standup Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state for the gateway.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    Router,
    routing::{get, post, put},
};
use standup_core::{ProviderAdapter, StandupError, StorageAdapter};
use standup_followup::{FollowupOrchestrator, ReportSynthesizer};
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct GatewayState {
    pub orchestrator: Arc<FollowupOrchestrator>,
    pub synthesizer: Arc<ReportSynthesizer>,
    /// Used directly by the connectivity, health and stats routes.
    pub provider: Arc<dyn ProviderAdapter>,
    pub storage: Arc<dyn StorageAdapter>,
    /// Service name shown in the banner.
    pub service_name: String,
    /// Process start time for uptime calculation.
    pub start_time: Instant,
}

/// Gateway server configuration (mirrors `GatewayConfig` from standup-config).
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host address to bind.
    pub host: String,
    /// Port to bind.
    pub port: u16,
}

/// Build the router with every route, tracing and permissive CORS.
pub fn build_router(state: GatewayState) -> Router {
    let service_routes = Router::new()
        .route("/", get(handlers::get_root))
        .route("/health", get(handlers::get_health))
        .route("/stats", get(handlers::get_stats))
        .with_state(state.clone());

    let api_routes = Router::new()
        .route("/api/work-updates", post(handlers::post_work_update))
        .route("/api/followups/start", post(handlers::post_start_followup))
        .route(
            "/api/followup/{session_id}/complete",
            put(handlers::put_complete_followup),
        )
        .route("/api/quality/analyze", post(handlers::post_analyze_quality))
        .route("/api/reports/weekly", post(handlers::post_weekly_report))
        .route("/api/followup-sessions/list", post(handlers::post_list_sessions))
        .route("/api/ai/test", get(handlers::get_ai_test))
        .with_state(state);

    Router::new()
        .merge(service_routes)
        .merge(api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Start the gateway HTTP server and serve until `cancel` fires.
pub async fn start_server(
    config: &ServerConfig,
    state: GatewayState,
    cancel: CancellationToken,
) -> Result<(), StandupError> {
    let app = build_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| StandupError::Internal(format!("failed to bind gateway to {addr}: {e}")))?;

    tracing::info!("Gateway server listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { cancel.cancelled().await })
        .await
        .map_err(|e| StandupError::Internal(format!("gateway server error: {e}")))?;

    tracing::info!("Gateway server stopped");
    Ok(())
}
