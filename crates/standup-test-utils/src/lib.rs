// SPDX-FileCopyrightText: 2026 Standup Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Standup integration tests.
//!
//! Provides a mock generation provider and a harness over a temp SQLite
//! store for fast, deterministic tests without external services.
//!
//! # Components
//!
//! - [`MockProvider`] - scripted provider with latency and call counting
//! - [`FlakyStorage`] - store wrapper that fails chosen writes on demand
//! - [`TestHarness`] - orchestrator, reconciler and synthesizer over a temp store

pub mod flaky_storage;
pub mod harness;
pub mod mock_provider;

pub use flaky_storage::FlakyStorage;
pub use harness::{TestHarness, pending_record, submission};
pub use mock_provider::MockProvider;
