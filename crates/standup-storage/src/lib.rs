// SPDX-FileCopyrightText: 2026 Standup Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence layer for the Standup follow-up service.
//!
//! Provides WAL-mode SQLite storage with embedded migrations, a single-writer
//! concurrency model via `tokio-rusqlite`, and the three collections the
//! follow-up engine works against: pending updates, follow-up sessions and
//! finalized daily records.

pub mod adapter;
pub mod database;
pub mod models;
pub mod queries;

pub use adapter::SqliteStorage;
pub use database::Database;
