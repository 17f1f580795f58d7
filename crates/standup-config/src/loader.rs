// SPDX-FileCopyrightText: 2026 Standup Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./standup.toml` > `~/.config/standup/standup.toml` > `/etc/standup/standup.toml`
//! with environment variable overrides via `STANDUP_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::StandupConfig;

/// Config sections, in the order their env prefixes are tried.
const SECTIONS: &[&str] = &[
    "service",
    "gateway",
    "storage",
    "lmstudio",
    "scoring",
    "followup",
    "reconciler",
    "report",
];

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/standup/standup.toml` (system-wide)
/// 3. `~/.config/standup/standup.toml` (user XDG config)
/// 4. `./standup.toml` (local directory)
/// 5. `STANDUP_*` environment variables
pub fn load_config() -> Result<StandupConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<StandupConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(StandupConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<StandupConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(StandupConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used internally for config loading.
///
/// Returns the Figment before extraction so callers can inspect metadata.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(StandupConfig::default()))
        .merge(Toml::file("/etc/standup/standup.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("standup/standup.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("standup.toml"))
        .merge(env_provider())
}

/// Create the environment variable provider using explicit `map()` for section-to-dot mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` because key names contain
/// underscores: `STANDUP_SCORING_WORD_COUNT_WEAK` must map to
/// `scoring.word_count_weak`, not `scoring.word.count.weak`.
fn env_provider() -> Env {
    Env::prefixed("STANDUP_").map(|key| map_env_key(key.as_str()).into())
}

/// Map a lowercased, prefix-stripped env var name to its dotted config key.
pub(crate) fn map_env_key(key: &str) -> String {
    for section in SECTIONS {
        if let Some(rest) = key.strip_prefix(section).and_then(|r| r.strip_prefix('_')) {
            return format!("{section}.{rest}");
        }
    }
    key.to_string()
}
