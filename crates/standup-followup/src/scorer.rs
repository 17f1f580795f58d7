// SPDX-FileCopyrightText: 2026 Standup Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Heuristic quality scoring of free-text work submissions.
//!
//! Five independent signals (length, action keywords, sentiment, repetition
//! of a recent submission, step-like structure) each contribute points to a
//! score bounded to 0-10. No network, no storage: recent history is passed in.

use std::sync::LazyLock;

use regex::Regex;
use standup_config::model::ScoringConfig;
use standup_core::{QualityBreakdown, SentimentLabel, StandupError};

/// Upper bound of the score.
pub const MAX_SCORE: f64 = 10.0;

const LENGTH_WEAK_POINTS: f64 = 0.5;
const LENGTH_THIN_POINTS: f64 = 2.0;
const LENGTH_FULL_POINTS: f64 = 3.0;
const KEYWORD_POINTS: f64 = 2.0;
const SENTIMENT_NEUTRAL_POINTS: f64 = 1.0;
const SENTIMENT_POSITIVE_POINTS: f64 = 1.5;
const ORIGINALITY_POINTS: f64 = 2.0;
const STRUCTURE_POINTS: f64 = 1.5;

const POSITIVE_WORDS: &[&str] = &[
    "completed", "finished", "done", "resolved", "shipped", "merged", "deployed", "working",
    "success", "successfully", "improved", "good", "great", "progress", "achieved", "learned",
    "solved", "passed", "smooth", "productive", "clear",
];

const NEGATIVE_WORDS: &[&str] = &[
    "stuck", "blocked", "failed", "failing", "broken", "confused", "difficult", "problem",
    "problems", "issue", "issues", "error", "errors", "struggling", "struggled", "slow",
    "unable", "nothing", "bad", "frustrating", "crash", "crashed",
];

/// Enumerated steps, bullets, or sequencing words.
static STRUCTURE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        Regex::new(r"(?m)^\s*(\d+[.)]|[-*\u{2022}])\s+\S").unwrap(),
        Regex::new(r"(?i)\b(first(ly)?|then|next|after that|finally|step \d+)\b").unwrap(),
    ]
});

/// Result of scoring one submission.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreOutcome {
    pub needs_followup: bool,
    pub breakdown: QualityBreakdown,
}

/// Quality scorer over a fixed set of tunables.
#[derive(Debug, Clone)]
pub struct QualityScorer {
    config: ScoringConfig,
    keywords: Vec<String>,
}

impl QualityScorer {
    pub fn new(config: ScoringConfig) -> Self {
        let keywords = config
            .keywords
            .iter()
            .map(|k| k.trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();
        Self { config, keywords }
    }

    pub fn threshold(&self) -> f64 {
        self.config.threshold
    }

    /// Score `text` against the owner's `recent` submission texts.
    ///
    /// Empty or whitespace-only text yields a zero score rather than an error.
    /// Errors when a threshold or sentiment bound is not a finite number.
    pub fn score(&self, text: &str, recent: &[&str]) -> Result<ScoreOutcome, StandupError> {
        self.check_tunables()?;
        let trimmed = text.trim();
        if trimmed.is_empty() {
            let breakdown = QualityBreakdown {
                word_count: 0,
                keyword_found: false,
                sentiment_label: SentimentLabel::Neutral,
                sentiment_polarity: 0.0,
                is_repetition: false,
                has_structure: false,
                quality_score: 0.0,
                flagged: true,
                flag_reasons: vec!["empty submission".to_string()],
                error: None,
            };
            return Ok(ScoreOutcome {
                needs_followup: true,
                breakdown,
            });
        }

        let lower = trimmed.to_lowercase();
        let mut reasons = Vec::new();
        let mut score = 0.0;

        let word_count = trimmed.split_whitespace().count();
        score += if word_count < self.config.word_count_weak {
            reasons.push(format!("too short ({word_count} words)"));
            LENGTH_WEAK_POINTS
        } else if word_count < self.config.word_count_ok {
            reasons.push(format!("thin detail ({word_count} words)"));
            LENGTH_THIN_POINTS
        } else {
            LENGTH_FULL_POINTS
        };

        let keyword_found = self.keywords.iter().any(|k| lower.contains(k.as_str()));
        if keyword_found {
            score += KEYWORD_POINTS;
        } else {
            reasons.push("no action keywords".to_string());
        }

        let polarity = polarity(&lower);
        let sentiment_label = self.label(polarity);
        score += match sentiment_label {
            SentimentLabel::Negative => {
                reasons.push("negative sentiment".to_string());
                0.0
            }
            SentimentLabel::Neutral => SENTIMENT_NEUTRAL_POINTS,
            SentimentLabel::Positive => SENTIMENT_POSITIVE_POINTS,
        };

        let is_repetition = self.repeats(&lower, recent);
        if is_repetition {
            reasons.push("repeats a recent submission".to_string());
        } else {
            score += ORIGINALITY_POINTS;
        }

        let has_structure = STRUCTURE_PATTERNS.iter().any(|re| re.is_match(trimmed));
        if has_structure {
            score += STRUCTURE_POINTS;
        }

        let quality_score = round1(score.clamp(0.0, MAX_SCORE));
        let needs_followup = quality_score < self.config.threshold;

        Ok(ScoreOutcome {
            needs_followup,
            breakdown: QualityBreakdown {
                word_count,
                keyword_found,
                sentiment_label,
                sentiment_polarity: round2(polarity),
                is_repetition,
                has_structure,
                quality_score,
                flagged: needs_followup,
                flag_reasons: reasons,
                error: None,
            },
        })
    }

    fn check_tunables(&self) -> Result<(), StandupError> {
        let bounds = [
            ("threshold", self.config.threshold),
            ("negative_sentiment", self.config.negative_sentiment),
            ("positive_sentiment", self.config.positive_sentiment),
            ("repetition_similarity", self.config.repetition_similarity),
        ];
        match bounds.iter().find(|(_, value)| !value.is_finite()) {
            Some((name, value)) => Err(StandupError::Scoring(format!(
                "scoring.{name} is not a finite number ({value})"
            ))),
            None => Ok(()),
        }
    }

    fn label(&self, polarity: f64) -> SentimentLabel {
        if polarity <= self.config.negative_sentiment {
            SentimentLabel::Negative
        } else if polarity >= self.config.positive_sentiment {
            SentimentLabel::Positive
        } else {
            SentimentLabel::Neutral
        }
    }

    fn repeats(&self, lower: &str, recent: &[&str]) -> bool {
        recent.iter().any(|prev| {
            let prev = prev.trim().to_lowercase();
            !prev.is_empty()
                && (prev == lower
                    || strsim::sorensen_dice(&prev, lower) >= self.config.repetition_similarity)
        })
    }
}

/// Lexicon polarity in `(-1, 1)`, damped so a single word never saturates.
fn polarity(lower: &str) -> f64 {
    let (mut pos, mut neg) = (0u32, 0u32);
    for word in lower.split(|c: char| !c.is_alphanumeric() && c != '\'') {
        if POSITIVE_WORDS.contains(&word) {
            pos += 1;
        } else if NEGATIVE_WORDS.contains(&word) {
            neg += 1;
        }
    }
    let (pos, neg) = (f64::from(pos), f64::from(neg));
    (pos - neg) / (pos + neg + 1.0)
}

fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn scorer() -> QualityScorer {
        QualityScorer::new(ScoringConfig::default())
    }

    #[test]
    fn fixed_bug_needs_followup() {
        let outcome = scorer().score("fixed bug", &[]).unwrap();
        let b = &outcome.breakdown;
        assert_eq!(b.word_count, 2);
        assert!(b.keyword_found);
        assert_eq!(b.sentiment_label, SentimentLabel::Neutral);
        assert_eq!(b.quality_score, 5.5);
        assert!(outcome.needs_followup);
        assert!(b.flagged);
        assert!(b.flag_reasons.iter().any(|r| r.starts_with("too short")));
    }

    #[test]
    fn detailed_structured_update_passes() {
        let text = "Completed the login form refactor today. First I wrote unit tests for the \
                    validation helpers, then I moved the API calls into a service module, and \
                    finally I deployed the branch to staging for review by the team lead.";
        let outcome = scorer().score(text, &[]).unwrap();
        assert!(!outcome.needs_followup, "breakdown: {:?}", outcome.breakdown);
        assert!(outcome.breakdown.has_structure);
        assert_eq!(outcome.breakdown.sentiment_label, SentimentLabel::Positive);
        assert_eq!(outcome.breakdown.quality_score, 10.0);
    }

    #[test]
    fn empty_text_scores_zero_without_error() {
        for text in ["", "   \n\t "] {
            let outcome = scorer().score(text, &[]).unwrap();
            assert!(outcome.needs_followup);
            assert_eq!(outcome.breakdown.quality_score, 0.0);
            assert_eq!(outcome.breakdown.word_count, 0);
        }
    }

    #[test]
    fn negative_sentiment_is_detected() {
        let outcome = scorer()
            .score("stuck on the build, tests failing and blocked by errors", &[])
            .unwrap();
        assert_eq!(outcome.breakdown.sentiment_label, SentimentLabel::Negative);
        assert!(outcome.breakdown.sentiment_polarity < 0.0);
        assert!(outcome
            .breakdown
            .flag_reasons
            .contains(&"negative sentiment".to_string()));
    }

    #[test]
    fn near_duplicate_of_recent_text_is_repetition() {
        let recent = ["Worked on the dashboard charts and fixed the tooltip bug"];
        let outcome = scorer()
            .score("worked on the dashboard charts and fixed the tooltip bugs", &recent)
            .unwrap();
        assert!(outcome.breakdown.is_repetition);

        let fresh = scorer()
            .score("Wrote migration scripts for the billing tables", &recent)
            .unwrap();
        assert!(!fresh.breakdown.is_repetition);
    }

    #[test]
    fn bullet_list_counts_as_structure() {
        let outcome = scorer()
            .score("- wrote tests\n- fixed review comments", &[])
            .unwrap();
        assert!(outcome.breakdown.has_structure);
    }

    #[test]
    fn threshold_is_configurable() {
        let lenient = QualityScorer::new(ScoringConfig {
            threshold: 5.0,
            ..ScoringConfig::default()
        });
        assert!(!lenient.score("fixed bug", &[]).unwrap().needs_followup);
        assert_eq!(lenient.threshold(), 5.0);
    }

    #[test]
    fn non_finite_tunables_are_a_scoring_error() {
        let broken = QualityScorer::new(ScoringConfig {
            negative_sentiment: f64::NAN,
            ..ScoringConfig::default()
        });
        let err = broken.score("stuck and blocked", &[]).unwrap_err();
        assert!(matches!(err, StandupError::Scoring(msg) if msg.contains("negative_sentiment")));

        let broken = QualityScorer::new(ScoringConfig {
            threshold: f64::INFINITY,
            ..ScoringConfig::default()
        });
        assert!(broken.score("", &[]).is_err());
    }

    proptest! {
        #[test]
        fn decision_matches_threshold(text in "[a-z ]{0,120}", threshold in 0.0f64..10.0) {
            let s = QualityScorer::new(ScoringConfig { threshold, ..ScoringConfig::default() });
            let outcome = s.score(&text, &[]).unwrap();
            let score = outcome.breakdown.quality_score;
            prop_assert!((0.0..=MAX_SCORE).contains(&score));
            prop_assert_eq!(outcome.needs_followup, score < threshold);
            prop_assert_eq!(s.score(&text, &[]).unwrap(), outcome);
        }
    }
}
