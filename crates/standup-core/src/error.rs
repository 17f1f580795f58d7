// SPDX-FileCopyrightText: 2026 Standup Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Standup follow-up service.

use thiserror::Error;

/// The primary error type used across all Standup adapter traits and core operations.
#[derive(Debug, Error)]
pub enum StandupError {
    /// Malformed caller input (wrong answer count, missing task text).
    #[error("validation error: {0}")]
    Validation(String),

    /// A referenced session, pending record or owner state does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// The caller does not own the referenced resource.
    #[error("access denied: {0}")]
    AccessDenied(String),

    /// Text-generation provider errors (connection failure, bad status, empty output).
    #[error("provider error: {message}")]
    Provider {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Storage backend errors (database connection, query failure, serialization).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// The quality scorer could not evaluate a submission.
    #[error("scoring error: {0}")]
    Scoring(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl StandupError {
    /// Shorthand for a [`StandupError::NotFound`] on the given entity.
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }

    /// True for errors caused by the caller rather than by the service.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::Validation(_) | Self::NotFound { .. } | Self::AccessDenied(_)
        )
    }
}
