// SPDX-FileCopyrightText: 2026 Standup Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mapping from [`StandupError`] to HTTP responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use standup_core::StandupError;

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Human-readable error description.
    pub detail: String,
}

/// Wrapper that lets handlers return `Result<_, ApiError>` and use `?`.
#[derive(Debug)]
pub struct ApiError(pub StandupError);

impl From<StandupError> for ApiError {
    fn from(err: StandupError) -> Self {
        Self(err)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            StandupError::Validation(_) => StatusCode::BAD_REQUEST,
            StandupError::AccessDenied(_) => StatusCode::FORBIDDEN,
            StandupError::NotFound { .. } => StatusCode::NOT_FOUND,
            StandupError::Provider { .. } | StandupError::Timeout { .. } => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Text placed in the `detail` field.
    pub fn detail(&self) -> String {
        match &self.0 {
            StandupError::Validation(message) => message.clone(),
            StandupError::AccessDenied(_) => "Access denied".to_string(),
            StandupError::NotFound { entity, .. } => match *entity {
                "pending work update" => "No pending work update found".to_string(),
                other => capitalize(&format!("{other} not found")),
            },
            other => other.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self.0, "request failed");
        } else {
            tracing::debug!(error = %self.0, status = status.as_u16(), "request rejected");
        }
        (status, Json(ErrorResponse { detail: self.detail() })).into_response()
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
