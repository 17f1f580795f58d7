// SPDX-FileCopyrightText: 2026 Standup Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde attributes,
//! such as threshold ordering, non-empty paths and a valid bind host.

use crate::diagnostic::ConfigError;
use crate::model::StandupConfig;

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &StandupConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let mut fail = |message: String| errors.push(ConfigError::Validation { message });

    let host = config.gateway.host.trim();
    if host.is_empty() {
        fail("gateway.host must not be empty".to_string());
    } else {
        let is_valid_ip = host.parse::<std::net::IpAddr>().is_ok();
        let is_valid_hostname = host
            .chars()
            .all(|c| c.is_alphanumeric() || c == '.' || c == '-' || c == ':');
        if !is_valid_ip && !is_valid_hostname {
            fail(format!(
                "gateway.host `{host}` is not a valid IP address or hostname"
            ));
        }
    }

    if config.storage.database_path.trim().is_empty() {
        fail("storage.database_path must not be empty".to_string());
    }

    if config.storage.pending_expiry_hours == Some(0) {
        fail("storage.pending_expiry_hours must be at least 1 when set".to_string());
    }

    if config.lmstudio.base_url.trim().is_empty() {
        fail("lmstudio.base_url must not be empty".to_string());
    }

    if config.lmstudio.timeout_secs == 0 {
        fail("lmstudio.timeout_secs must be at least 1".to_string());
    }

    let scoring = &config.scoring;
    if !(0.0..=10.0).contains(&scoring.threshold) {
        fail(format!(
            "scoring.threshold must be within 0-10, got {}",
            scoring.threshold
        ));
    }

    if scoring.word_count_weak > scoring.word_count_ok {
        fail(format!(
            "scoring.word_count_weak ({}) must not exceed scoring.word_count_ok ({})",
            scoring.word_count_weak, scoring.word_count_ok
        ));
    }

    if scoring.negative_sentiment >= scoring.positive_sentiment {
        fail(format!(
            "scoring.negative_sentiment ({}) must be below scoring.positive_sentiment ({})",
            scoring.negative_sentiment, scoring.positive_sentiment
        ));
    }

    if scoring.keywords.iter().all(|k| k.trim().is_empty()) {
        fail("scoring.keywords must contain at least one keyword".to_string());
    }

    if !(0.0..=1.0).contains(&scoring.repetition_similarity) {
        fail(format!(
            "scoring.repetition_similarity must be within 0-1, got {}",
            scoring.repetition_similarity
        ));
    }

    if config.followup.required_answers != 3 {
        fail(format!(
            "followup.required_answers must be 3, got {}",
            config.followup.required_answers
        ));
    }

    if config.followup.max_history_items == 0 {
        fail("followup.max_history_items must be at least 1".to_string());
    }

    let reconciler = &config.reconciler;
    if reconciler.interval_secs == 0 {
        fail("reconciler.interval_secs must be at least 1".to_string());
    }
    if reconciler.horizon_hours == 0 || reconciler.horizon_hours_with_expiry == 0 {
        fail("reconciler horizons must be at least 1 hour".to_string());
    }

    if config.report.default_range_days == 0 {
        fail("report.default_range_days must be at least 1".to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn messages(config: &StandupConfig) -> Vec<String> {
        validate_config(config)
            .unwrap_err()
            .into_iter()
            .map(|e| e.to_string())
            .collect()
    }

    #[test]
    fn default_config_validates() {
        let config = StandupConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn empty_database_path_fails_validation() {
        let mut config = StandupConfig::default();
        config.storage.database_path = "".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(errors.iter().any(
            |e| matches!(e, ConfigError::Validation { message } if message.contains("database_path"))
        ));
    }

    #[test]
    fn inverted_word_thresholds_fail_validation() {
        let mut config = StandupConfig::default();
        config.scoring.word_count_weak = 30;
        assert!(messages(&config).iter().any(|m| m.contains("word_count_weak")));
    }

    #[test]
    fn inverted_sentiment_thresholds_fail_validation() {
        let mut config = StandupConfig::default();
        config.scoring.negative_sentiment = 0.5;
        assert!(messages(&config).iter().any(|m| m.contains("negative_sentiment")));
    }

    #[test]
    fn required_answers_is_fixed_at_three() {
        let mut config = StandupConfig::default();
        config.followup.required_answers = 4;
        assert!(messages(&config).iter().any(|m| m.contains("required_answers")));
    }

    #[test]
    fn all_errors_are_collected() {
        let mut config = StandupConfig::default();
        config.scoring.threshold = 11.0;
        config.reconciler.interval_secs = 0;
        config.scoring.keywords.clear();
        config.gateway.host = "bad host!".to_string();
        assert_eq!(validate_config(&config).unwrap_err().len(), 4);
    }
}
