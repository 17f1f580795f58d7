// SPDX-FileCopyrightText: 2026 Standup Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP gateway for the follow-up engine.
//!
//! Every route is a thin adapter over [`standup_followup`]: it parses the
//! JSON body, calls one orchestrator, synthesizer or adapter operation, and
//! shapes the result. Errors become `{"detail": ...}` bodies through
//! [`ApiError`].

pub mod error;
pub mod handlers;
pub mod server;

pub use error::ApiError;
pub use server::{GatewayState, ServerConfig, build_router, start_server};
