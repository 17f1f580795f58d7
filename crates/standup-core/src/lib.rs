// SPDX-FileCopyrightText: 2026 Standup Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Standup follow-up service.
//!
//! This crate provides the error taxonomy, the domain types shared by every
//! other crate (submissions, pending records, sessions, daily records), and
//! the adapter traits behind which the store and the text-generation backend
//! sit.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::StandupError;
pub use types::{
    AdapterType, ConnectionProbe, DailyRecord, FollowupSession, HealthStatus, PendingRecord,
    ProbeStatus, ProviderMessage, ProviderRequest, ProviderResponse, QualityBreakdown,
    SentimentLabel, SessionStatus, StoreStats, Submission, TokenUsage, WorkStatus,
};

pub use traits::{PluginAdapter, ProviderAdapter, StorageAdapter};
