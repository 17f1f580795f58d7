// SPDX-FileCopyrightText: 2026 Standup Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Standup follow-up service.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Standup configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StandupConfig {
    /// Service identity and logging.
    #[serde(default)]
    pub service: ServiceConfig,

    /// HTTP gateway settings.
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Local text-generation server settings.
    #[serde(default)]
    pub lmstudio: LmStudioConfig,

    /// Quality scoring thresholds.
    #[serde(default)]
    pub scoring: ScoringConfig,

    /// Follow-up session settings.
    #[serde(default)]
    pub followup: FollowupConfig,

    /// Stale pending-record sweep settings.
    #[serde(default)]
    pub reconciler: ReconcilerConfig,

    /// Weekly report settings.
    #[serde(default)]
    pub report: ReportConfig,
}

/// Service identity configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceConfig {
    /// Display name reported by the root endpoint.
    #[serde(default = "default_service_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: default_service_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_service_name() -> String {
    "standup".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// HTTP gateway configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    /// Host address to bind to.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,

    /// Age after which the store itself drops pending records.
    /// `None` leaves expiry entirely to the reconciler.
    #[serde(default = "default_pending_expiry_hours")]
    pub pending_expiry_hours: Option<u32>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
            pending_expiry_hours: default_pending_expiry_hours(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("standup").join("standup.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("standup.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_wal_mode() -> bool {
    true
}

fn default_pending_expiry_hours() -> Option<u32> {
    Some(24)
}

/// LM Studio (OpenAI-compatible) server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LmStudioConfig {
    /// Base URL up to and including the `/v1` prefix.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Model identifier sent with every request.
    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Completion token cap for question generation.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Upper bound on a single generation call, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// System message prepended to question-generation prompts.
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,
}

impl Default for LmStudioConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_timeout_secs(),
            system_prompt: default_system_prompt(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:1234/v1".to_string()
}

fn default_model() -> String {
    "local-model".to_string()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> u32 {
    500
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_system_prompt() -> String {
    "You are an AI assistant helping supervisors track intern progress. \
     Generate clear, specific follow-up questions."
        .to_string()
}

/// Quality scoring configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ScoringConfig {
    /// Scores strictly below this trigger a follow-up.
    #[serde(default = "default_threshold")]
    pub threshold: f64,

    /// Word counts below this are considered weak.
    #[serde(default = "default_word_count_weak")]
    pub word_count_weak: usize,

    /// Word counts below this (and at least `word_count_weak`) are considered thin.
    #[serde(default = "default_word_count_ok")]
    pub word_count_ok: usize,

    /// Polarity at or below which text is labelled negative.
    #[serde(default = "default_negative_sentiment")]
    pub negative_sentiment: f64,

    /// Polarity at or above which text is labelled positive.
    #[serde(default = "default_positive_sentiment")]
    pub positive_sentiment: f64,

    /// Action keywords, matched as lowercase substrings.
    #[serde(default = "default_keywords")]
    pub keywords: Vec<String>,

    /// Similarity to a recent submission at or above which text counts as repeated.
    #[serde(default = "default_repetition_similarity")]
    pub repetition_similarity: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
            word_count_weak: default_word_count_weak(),
            word_count_ok: default_word_count_ok(),
            negative_sentiment: default_negative_sentiment(),
            positive_sentiment: default_positive_sentiment(),
            keywords: default_keywords(),
            repetition_similarity: default_repetition_similarity(),
        }
    }
}

fn default_threshold() -> f64 {
    6.0
}

fn default_word_count_weak() -> usize {
    10
}

fn default_word_count_ok() -> usize {
    25
}

fn default_negative_sentiment() -> f64 {
    -0.3
}

fn default_positive_sentiment() -> f64 {
    0.2
}

fn default_keywords() -> Vec<String> {
    [
        "implement", "fix", "test", "deploy", "review", "design", "bug", "ticket", "block", "wip",
        "refactor", "docs", "complete", "debug", "meeting", "plann", "research", "learn", "code",
        "develop", "build", "write", "updat",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_repetition_similarity() -> f64 {
    0.85
}

/// Follow-up session configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FollowupConfig {
    /// Number of answers a completion must carry. Fixed at 3.
    #[serde(default = "default_required_answers")]
    pub required_answers: usize,

    /// Maximum history items fed into question generation.
    #[serde(default = "default_max_history_items")]
    pub max_history_items: usize,

    /// How far back history is gathered, in days.
    #[serde(default = "default_history_window_days")]
    pub history_window_days: u32,
}

impl Default for FollowupConfig {
    fn default() -> Self {
        Self {
            required_answers: default_required_answers(),
            max_history_items: default_max_history_items(),
            history_window_days: default_history_window_days(),
        }
    }
}

fn default_required_answers() -> usize {
    3
}

fn default_max_history_items() -> usize {
    10
}

fn default_history_window_days() -> u32 {
    7
}

/// Stale pending-record sweep configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ReconcilerConfig {
    /// Seconds between sweeps.
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,

    /// Staleness horizon when the store has no expiry of its own.
    #[serde(default = "default_horizon_hours")]
    pub horizon_hours: u32,

    /// Staleness horizon when the store-level expiry is active.
    #[serde(default = "default_horizon_hours_with_expiry")]
    pub horizon_hours_with_expiry: u32,
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            horizon_hours: default_horizon_hours(),
            horizon_hours_with_expiry: default_horizon_hours_with_expiry(),
        }
    }
}

fn default_interval_secs() -> u64 {
    3600
}

fn default_horizon_hours() -> u32 {
    25
}

fn default_horizon_hours_with_expiry() -> u32 {
    24
}

/// Weekly report configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ReportConfig {
    /// Completion token cap for report synthesis.
    #[serde(default = "default_report_max_tokens")]
    pub max_tokens: u32,

    /// Range covered when the caller gives no start date.
    #[serde(default = "default_range_days")]
    pub default_range_days: u32,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            max_tokens: default_report_max_tokens(),
            default_range_days: default_range_days(),
        }
    }
}

fn default_report_max_tokens() -> u32 {
    1500
}

fn default_range_days() -> u32 {
    7
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_keywords_cover_action_stems() {
        let kw = default_keywords();
        assert_eq!(kw.len(), 23);
        assert!(kw.iter().any(|k| k == "plann"));
        assert!(kw.iter().all(|k| k == &k.to_lowercase()));
    }

    #[test]
    fn default_database_path_ends_with_db_file() {
        assert!(StorageConfig::default().database_path.ends_with("standup.db"));
    }

    #[test]
    fn default_horizons_bracket_a_day() {
        let r = ReconcilerConfig::default();
        assert_eq!(r.horizon_hours_with_expiry, 24);
        assert_eq!(r.horizon_hours, 25);
    }
}
