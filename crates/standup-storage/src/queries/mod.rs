// SPDX-FileCopyrightText: 2026 Standup Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Query modules, one per collection. Each takes `&Database` and runs on its connection thread.

pub mod daily;
pub mod pending;
pub mod sessions;
