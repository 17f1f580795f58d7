// SPDX-FileCopyrightText: 2026 Standup Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `standup analyze` implementation.

use std::sync::Arc;

use serde_json::json;
use standup_config::StandupConfig;
use standup_core::{ProviderAdapter, StandupError, StorageAdapter};
use standup_lmstudio::LmStudioProvider;

use crate::serve::{build_orchestrator, open_storage};

/// Scores `text` for `user` and prints the breakdown as JSON on stdout.
///
/// The provider is constructed but never called.
pub async fn run_analyze(config: StandupConfig, user: &str, text: &str) -> Result<(), StandupError> {
    let storage = open_storage(&config).await?;
    let provider: Arc<dyn ProviderAdapter> = Arc::new(LmStudioProvider::new(&config.lmstudio)?);
    let orchestrator = build_orchestrator(&config, storage.clone(), provider);

    let analysis = orchestrator.analyze(user, text).await?;
    let output = json!({
        "user_id": user.trim(),
        "quality_score": analysis.breakdown.quality_score,
        "needs_followup": analysis.needs_followup,
        "recommendation": analysis.recommendation,
        "threshold": analysis.threshold,
        "analysis": analysis.breakdown,
    });
    let rendered = serde_json::to_string_pretty(&output)
        .map_err(|e| StandupError::Internal(format!("failed to render analysis: {e}")))?;
    println!("{rendered}");

    storage.close().await
}
