// SPDX-FileCopyrightText: 2026 Standup Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Stored document shapes for pending updates and daily records.
//!
//! Bodies are JSON. Older documents used different field names
//! (`description`, `challenges`, `plans`, `internId`, `userId`,
//! `update_date`), so reading goes through a loose document struct and an
//! explicit [`normalize`](PendingDocument::normalize) step into the core type.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use standup_core::{DailyRecord, PendingRecord, QualityBreakdown, WorkStatus};

/// Timestamp format for every TEXT timestamp column. Sorts lexicographically.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

/// Parse a stored timestamp. Accepts the canonical format and any RFC 3339 value.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|ts| ts.with_timezone(&Utc))
}

pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}

/// JSON body of a `pending_updates` row.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PendingDocument {
    #[serde(default, alias = "internId", alias = "userId", alias = "intern_id", alias = "user_id")]
    pub owner_id: Option<String>,
    #[serde(default, alias = "update_date")]
    pub date: Option<String>,
    #[serde(default)]
    pub stack: Option<String>,
    #[serde(default, alias = "description")]
    pub task: Option<String>,
    #[serde(default, alias = "challenges")]
    pub progress: Option<String>,
    #[serde(default, alias = "plans")]
    pub blockers: Option<String>,
    #[serde(default)]
    pub status: Option<WorkStatus>,
    #[serde(default, alias = "qualityScore")]
    pub quality_score: Option<f64>,
    #[serde(default, alias = "qualityBreakdown")]
    pub breakdown: Option<QualityBreakdown>,
    #[serde(default, alias = "submittedAt", alias = "timestamp")]
    pub submitted_at: Option<String>,
    #[serde(default, alias = "followupCompleted")]
    pub followup_completed: Option<bool>,
}

/// Row columns that are authoritative over whatever the body says.
pub struct RowKeys {
    pub id: String,
    pub owner_id: String,
    pub date: String,
}

impl PendingDocument {
    pub fn from_record(record: &PendingRecord) -> Self {
        Self {
            owner_id: Some(record.owner_id.clone()),
            date: Some(record.date.to_string()),
            stack: Some(record.stack.clone()),
            task: Some(record.task.clone()),
            progress: Some(record.progress.clone()),
            blockers: Some(record.blockers.clone()),
            status: Some(record.status),
            quality_score: Some(record.quality_score),
            breakdown: record.breakdown.clone(),
            submitted_at: Some(format_timestamp(record.submitted_at)),
            followup_completed: Some(record.followup_completed),
        }
    }

    /// Fill defaults for anything missing. Returns `None` only when neither
    /// the row nor the body carries a usable date or submission time.
    pub fn normalize(self, keys: RowKeys, submitted_at: &str) -> Option<PendingRecord> {
        let date = parse_date(&keys.date).or_else(|| self.date.as_deref().and_then(parse_date))?;
        let submitted_at = parse_timestamp(submitted_at)
            .or_else(|| self.submitted_at.as_deref().and_then(parse_timestamp))?;
        Some(PendingRecord {
            id: keys.id,
            owner_id: non_empty(keys.owner_id).or(self.owner_id).unwrap_or_default(),
            date,
            stack: self.stack.unwrap_or_default(),
            task: self.task.unwrap_or_default(),
            progress: self.progress.unwrap_or_default(),
            blockers: self.blockers.unwrap_or_default(),
            status: self.status.unwrap_or(WorkStatus::Working),
            quality_score: self.quality_score.unwrap_or(0.0),
            breakdown: self.breakdown,
            submitted_at,
            followup_completed: self.followup_completed.unwrap_or(false),
        })
    }
}

/// JSON body of a `daily_records` row.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DailyDocument {
    #[serde(default, alias = "internId", alias = "userId", alias = "intern_id", alias = "user_id")]
    pub owner_id: Option<String>,
    #[serde(default, alias = "update_date")]
    pub date: Option<String>,
    #[serde(default)]
    pub stack: Option<String>,
    #[serde(default, alias = "description")]
    pub task: Option<String>,
    #[serde(default, alias = "challenges")]
    pub progress: Option<String>,
    #[serde(default, alias = "plans")]
    pub blockers: Option<String>,
    #[serde(default)]
    pub status: Option<WorkStatus>,
    #[serde(default, alias = "qualityScore")]
    pub quality_score: Option<f64>,
    #[serde(default, alias = "followupSkipped")]
    pub followup_skipped: Option<bool>,
    #[serde(default, alias = "followupCompleted")]
    pub followup_completed: Option<bool>,
    #[serde(default, alias = "followupAnswers")]
    pub followup_answers: Option<Vec<String>>,
    #[serde(default, alias = "qualityBreakdown")]
    pub breakdown: Option<QualityBreakdown>,
}

impl DailyDocument {
    pub fn from_record(record: &DailyRecord) -> Self {
        Self {
            owner_id: Some(record.owner_id.clone()),
            date: Some(record.date.to_string()),
            stack: Some(record.stack.clone()),
            task: Some(record.task.clone()),
            progress: Some(record.progress.clone()),
            blockers: Some(record.blockers.clone()),
            status: Some(record.status),
            quality_score: record.quality_score,
            followup_skipped: Some(record.followup_skipped),
            followup_completed: Some(record.followup_completed),
            followup_answers: Some(record.followup_answers.clone()),
            breakdown: record.breakdown.clone(),
        }
    }

    pub fn normalize(self, keys: RowKeys) -> Option<DailyRecord> {
        let date = parse_date(&keys.date).or_else(|| self.date.as_deref().and_then(parse_date))?;
        Some(DailyRecord {
            id: keys.id,
            owner_id: non_empty(keys.owner_id).or(self.owner_id).unwrap_or_default(),
            date,
            stack: self.stack.unwrap_or_default(),
            task: self.task.unwrap_or_default(),
            progress: self.progress.unwrap_or_default(),
            blockers: self.blockers.unwrap_or_default(),
            status: self.status.unwrap_or(WorkStatus::Working),
            quality_score: self.quality_score,
            followup_skipped: self.followup_skipped.unwrap_or(false),
            followup_completed: self.followup_completed.unwrap_or(false),
            followup_answers: self.followup_answers.unwrap_or_default(),
            breakdown: self.breakdown,
        })
    }
}

fn non_empty(s: String) -> Option<String> {
    if s.is_empty() { None } else { Some(s) }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(owner: &str) -> RowKeys {
        RowKeys {
            id: "row-1".into(),
            owner_id: owner.into(),
            date: "2026-03-02".into(),
        }
    }

    #[test]
    fn legacy_pending_fields_are_aliased() {
        let body = r#"{
            "internId": "intern-7",
            "description": "wrote the parser",
            "challenges": "half done",
            "plans": "finish tests",
            "status": "wfh",
            "qualityScore": 4.5
        }"#;
        let doc: PendingDocument = serde_json::from_str(body).unwrap();
        let record = doc
            .normalize(keys(""), "2026-03-02T09:15:00.000Z")
            .unwrap();
        assert_eq!(record.owner_id, "intern-7");
        assert_eq!(record.task, "wrote the parser");
        assert_eq!(record.progress, "half done");
        assert_eq!(record.blockers, "finish tests");
        assert_eq!(record.status, WorkStatus::Remote);
        assert_eq!(record.quality_score, 4.5);
        assert_eq!(record.stack, "");
        assert!(!record.followup_completed);
    }

    #[test]
    fn row_columns_win_over_body() {
        let doc = PendingDocument {
            owner_id: Some("someone-else".into()),
            ..Default::default()
        };
        let record = doc.normalize(keys("intern-1"), "2026-03-02T09:15:00.000Z").unwrap();
        assert_eq!(record.owner_id, "intern-1");
    }

    #[test]
    fn unparseable_timestamp_rejects_pending_document() {
        let doc = PendingDocument::default();
        assert!(doc.normalize(keys("intern-1"), "yesterday").is_none());
    }

    #[test]
    fn legacy_daily_document_fills_missing_text_with_empty() {
        let body = r#"{"userId": "u-2", "update_date": "2026-02-27", "description": "standup"}"#;
        let doc: DailyDocument = serde_json::from_str(body).unwrap();
        let record = doc
            .normalize(RowKeys {
                id: "d-1".into(),
                owner_id: String::new(),
                date: String::new(),
            })
            .unwrap();
        assert_eq!(record.owner_id, "u-2");
        assert_eq!(record.date, NaiveDate::from_ymd_opt(2026, 2, 27).unwrap());
        assert_eq!(record.task, "standup");
        assert_eq!(record.progress, "");
        assert_eq!(record.blockers, "");
        assert!(record.followup_answers.is_empty());
        assert_eq!(record.quality_score, None);
    }

    #[test]
    fn timestamps_sort_lexicographically() {
        let a = format_timestamp(DateTime::parse_from_rfc3339("2026-03-02T09:00:00Z").unwrap().into());
        let b = format_timestamp(DateTime::parse_from_rfc3339("2026-03-02T10:00:00Z").unwrap().into());
        assert!(a < b);
        assert_eq!(a, "2026-03-02T09:00:00.000Z");
        assert_eq!(parse_timestamp(&a).unwrap().to_rfc3339(), "2026-03-02T09:00:00+00:00");
    }
}
