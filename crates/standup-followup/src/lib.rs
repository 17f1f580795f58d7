// SPDX-FileCopyrightText: 2026 Standup Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Quality-gated follow-up engine.
//!
//! Submissions are scored; good ones are finalized straight into the daily
//! record, weak ones are staged and go through a three-question follow-up
//! session before being finalized. A background reconciler removes staged
//! records that were never resolved, and the report synthesizer turns a
//! range of finalized records into a narrative weekly report.

pub mod history;
pub mod orchestrator;
pub mod questions;
pub mod reconciler;
pub mod report;
pub mod scorer;

use std::time::Duration;

use standup_config::model::LmStudioConfig;
use standup_core::{ProviderMessage, ProviderRequest};

pub use orchestrator::{
    Analysis, CompletedSession, FollowupOrchestrator, StartedSession, SubmitOutcome,
};
pub use questions::{DEFAULT_QUESTIONS, QuestionGenerator, QuestionSet, QuestionSource};
pub use reconciler::{Reconciler, ReconcilerHandle, SweepReport};
pub use report::{Report, ReportSummary, ReportSynthesizer};
pub use scorer::{QualityScorer, ScoreOutcome};

/// A single-turn request using the configured model and system prompt.
pub(crate) fn provider_request(
    config: &LmStudioConfig,
    prompt: String,
    max_tokens: u32,
    timeout: Duration,
) -> ProviderRequest {
    ProviderRequest {
        model: config.model.clone(),
        messages: vec![
            ProviderMessage::system(config.system_prompt.clone()),
            ProviderMessage::user(prompt),
        ],
        temperature: config.temperature,
        max_tokens,
        timeout,
    }
}
