// SPDX-FileCopyrightText: 2026 Standup Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types shared across the storage, generation and follow-up crates.

use std::time::Duration;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Placeholder text written into every field of a leave record.
pub const LEAVE_PLACEHOLDER: &str = "On Leave";

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the kind of adapter behind a trait object.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Provider,
    Storage,
}

// --- Submissions ---

/// Attendance status attached to a daily submission.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum WorkStatus {
    Working,
    #[serde(alias = "wfh")]
    #[strum(to_string = "remote", serialize = "wfh")]
    Remote,
    Leave,
}

/// A daily work submission as received from a caller. Never persisted as such.
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub owner_id: String,
    pub status: WorkStatus,
    pub stack: String,
    pub task: Option<String>,
    pub progress: Option<String>,
    pub blockers: Option<String>,
    pub date: NaiveDate,
}

impl Submission {
    /// Task text with an absent value read as empty.
    pub fn task_text(&self) -> &str {
        self.task.as_deref().unwrap_or("")
    }
}

// --- Quality scoring ---

/// Sentiment bucket derived from the polarity and the configured thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SentimentLabel {
    Negative,
    Neutral,
    Positive,
}

/// Signals computed for one submission text. Never mutated after computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityBreakdown {
    pub word_count: usize,
    pub keyword_found: bool,
    pub sentiment_label: SentimentLabel,
    pub sentiment_polarity: f64,
    pub is_repetition: bool,
    pub has_structure: bool,
    pub quality_score: f64,
    pub flagged: bool,
    pub flag_reasons: Vec<String>,
    /// Set when the breakdown stands in for a scorer failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl QualityBreakdown {
    /// The breakdown recorded when scoring itself failed: zero score, flagged.
    pub fn failed(reason: impl Into<String>) -> Self {
        let reason = reason.into();
        Self {
            word_count: 0,
            keyword_found: false,
            sentiment_label: SentimentLabel::Neutral,
            sentiment_polarity: 0.0,
            is_repetition: false,
            has_structure: false,
            quality_score: 0.0,
            flagged: true,
            flag_reasons: vec![format!("scoring failed: {reason}")],
            error: Some(reason),
        }
    }
}

// --- Persisted entities ---

/// Ephemeral staging record for a submission awaiting follow-up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingRecord {
    pub id: String,
    pub owner_id: String,
    pub date: NaiveDate,
    pub stack: String,
    pub task: String,
    pub progress: String,
    pub blockers: String,
    pub status: WorkStatus,
    pub quality_score: f64,
    pub breakdown: Option<QualityBreakdown>,
    pub submitted_at: DateTime<Utc>,
    pub followup_completed: bool,
}

/// Lifecycle state of a follow-up session.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SessionStatus {
    Pending,
    Completed,
}

/// An interactive question/answer session opened for a pending record.
///
/// `answers` is positionally aligned with `questions` at all times.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FollowupSession {
    pub id: String,
    pub owner_id: String,
    pub pending_id: String,
    pub session_date: NaiveDate,
    pub questions: Vec<String>,
    pub answers: Vec<String>,
    pub status: SessionStatus,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl FollowupSession {
    /// Opens a new session with blank answers aligned to `questions`.
    pub fn open(
        id: String,
        owner_id: String,
        pending_id: String,
        session_date: NaiveDate,
        questions: Vec<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        let answers = vec![String::new(); questions.len()];
        Self {
            id,
            owner_id,
            pending_id,
            session_date,
            questions,
            answers,
            status: SessionStatus::Pending,
            created_at,
            completed_at: None,
        }
    }
}

/// The durable, finalized record for one owner and day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyRecord {
    pub id: String,
    pub owner_id: String,
    pub date: NaiveDate,
    pub stack: String,
    pub task: String,
    pub progress: String,
    pub blockers: String,
    pub status: WorkStatus,
    pub quality_score: Option<f64>,
    pub followup_skipped: bool,
    pub followup_completed: bool,
    pub followup_answers: Vec<String>,
    pub breakdown: Option<QualityBreakdown>,
}

/// Per-collection counts reported by the store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreStats {
    pub pending_updates: u64,
    pub sessions_pending: u64,
    pub sessions_completed: u64,
    pub daily_records: u64,
    pub expiry_active: bool,
}

// --- Text generation ---

/// A single role-tagged message sent to a text-generation provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderMessage {
    pub role: String,
    pub content: String,
}

impl ProviderMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// A request to a text-generation provider.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderRequest {
    pub model: String,
    pub messages: Vec<ProviderMessage>,
    pub temperature: f32,
    pub max_tokens: u32,
    /// Upper bound on the whole call, including retries.
    pub timeout: Duration,
}

/// Token accounting returned by the provider, when it reports any.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

/// A completed generation.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderResponse {
    pub id: String,
    pub content: String,
    pub model: String,
    pub usage: Option<TokenUsage>,
}

/// Outcome of a connectivity probe against the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ProbeStatus {
    Working,
    Failed,
    Error,
}

/// Result of [`ProviderAdapter::test_connection`](crate::ProviderAdapter::test_connection).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionProbe {
    pub status: ProbeStatus,
    pub provider: String,
    pub server_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ConnectionProbe {
    pub fn is_working(&self) -> bool {
        self.status == ProbeStatus::Working
    }
}
