// SPDX-FileCopyrightText: 2026 Standup Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Weekly report synthesis over finalized records and follow-up sessions.
//!
//! Unlike question generation there is no fallback text: a failed
//! generation call is returned to the caller as an error.

use std::fmt::Write as _;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Days, NaiveDate, Utc};
use serde::Serialize;
use standup_config::model::{LmStudioConfig, ReportConfig};
use standup_core::{
    DailyRecord, FollowupSession, PluginAdapter, ProviderAdapter, StandupError, StorageAdapter,
};
use tracing::info;

use crate::provider_request;

/// Message returned when the range holds no finalized records.
pub const NO_DATA_MESSAGE: &str = "No work updates found for the specified date range";

const REPORT_SECTIONS: &str = "\
1. **Executive Summary** - Overall performance and progress
2. **Daily Work Breakdown** - What was accomplished each day
3. **Key Achievements** - Major completions and successes
4. **Challenges & Blockers** - Issues faced and how they were addressed
5. **Areas for Improvement** - Constructive feedback
6. **Plans for Next Week** - Recommendations
7. **Manager Notes** - Concerns or praise";

/// Counts and range accompanying a generated report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportSummary {
    pub work_updates_count: usize,
    pub followup_sessions_count: usize,
    pub date_range: String,
    pub provider: String,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Report {
    /// No finalized records in range; the provider was not called.
    NoData {
        message: String,
        start: NaiveDate,
        end: NaiveDate,
    },
    Generated {
        text: String,
        start: NaiveDate,
        end: NaiveDate,
        summary: ReportSummary,
    },
}

pub struct ReportSynthesizer {
    storage: Arc<dyn StorageAdapter>,
    provider: Arc<dyn ProviderAdapter>,
    llm: LmStudioConfig,
    config: ReportConfig,
}

impl ReportSynthesizer {
    pub fn new(
        storage: Arc<dyn StorageAdapter>,
        provider: Arc<dyn ProviderAdapter>,
        llm: LmStudioConfig,
        config: ReportConfig,
    ) -> Self {
        Self {
            storage,
            provider,
            llm,
            config,
        }
    }

    /// Builds the report for `owner_id` over `[start, end]`.
    ///
    /// A missing `end` means `today`; a missing `start` means
    /// `default_range_days` before the end.
    pub async fn build_report(
        &self,
        owner_id: &str,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        today: NaiveDate,
    ) -> Result<Report, StandupError> {
        let owner_id = owner_id.trim();
        if owner_id.is_empty() {
            return Err(StandupError::Validation("user_id is required".into()));
        }
        let end = end.unwrap_or(today);
        let start = match start {
            Some(start) => start,
            None => end
                .checked_sub_days(Days::new(u64::from(self.config.default_range_days)))
                .unwrap_or(end),
        };
        if start > end {
            return Err(StandupError::Validation(format!(
                "start date {start} is after end date {end}"
            )));
        }

        let records = self
            .storage
            .daily_records_between(owner_id, start, end)
            .await?;
        if records.is_empty() {
            info!(owner = %owner_id, %start, %end, "no finalized records for report");
            return Ok(Report::NoData {
                message: NO_DATA_MESSAGE.to_string(),
                start,
                end,
            });
        }

        let (from, to) = day_bounds(start, end);
        let sessions = self.storage.sessions_between(owner_id, from, to).await?;

        let prompt = build_report_prompt(owner_id, start, end, &records, &sessions);
        let request = provider_request(
            &self.llm,
            prompt,
            self.config.max_tokens,
            Duration::from_secs(self.llm.timeout_secs),
        );
        let response = self.provider.complete(request).await?;
        let text = response.content.trim().to_string();
        if text.is_empty() {
            return Err(StandupError::Provider {
                message: "report generation returned no text".into(),
                source: None,
            });
        }

        info!(
            owner = %owner_id,
            records = records.len(),
            sessions = sessions.len(),
            "weekly report generated"
        );
        Ok(Report::Generated {
            text,
            start,
            end,
            summary: ReportSummary {
                work_updates_count: records.len(),
                followup_sessions_count: sessions.len(),
                date_range: format!("{} to {}", start.format("%Y-%m-%d"), end.format("%Y-%m-%d")),
                provider: self.provider.name().to_string(),
                generated_at: Utc::now(),
            },
        })
    }
}

/// First instant of `start` to the last millisecond of `end`.
fn day_bounds(start: NaiveDate, end: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let from = start.and_time(chrono::NaiveTime::MIN).and_utc();
    let to = end
        .succ_opt()
        .map(|next| next.and_time(chrono::NaiveTime::MIN).and_utc() - chrono::Duration::milliseconds(1))
        .unwrap_or_else(|| end.and_time(chrono::NaiveTime::MIN).and_utc());
    (from, to)
}

/// Renders the report prompt.
pub fn build_report_prompt(
    owner_id: &str,
    start: NaiveDate,
    end: NaiveDate,
    records: &[DailyRecord],
    sessions: &[FollowupSession],
) -> String {
    let mut days = String::new();
    for (i, record) in records.iter().enumerate() {
        let progress = non_empty_or(&record.progress, "Not specified");
        let blockers = non_empty_or(&record.blockers, "None mentioned");
        let _ = write!(
            days,
            "\nDay {} ({}):\n- Status: {}\n- Tasks: {}\n- Progress: {progress}\n- Challenges: {blockers}\n",
            i + 1,
            record.date.format("%Y-%m-%d"),
            record.status,
            record.task.trim(),
        );
    }

    let followups = if sessions.is_empty() {
        "No follow-up sessions this week.".to_string()
    } else {
        let mut out = String::new();
        for (i, session) in sessions.iter().enumerate() {
            let pairs: Vec<String> = session
                .questions
                .iter()
                .zip(&session.answers)
                .map(|(q, a)| format!("Q: {q}\nA: {}", non_empty_or(a, "Not answered")))
                .collect();
            let _ = write!(
                out,
                "\nFollow-up Session {} ({}) - Status: {}\n{}\n",
                i + 1,
                session.created_at.format("%Y-%m-%d"),
                session.status,
                pairs.join("\n"),
            );
        }
        out
    };

    format!(
        "You are generating a comprehensive weekly report for an intern's progress and performance.\n\n\
         **Intern ID:** {owner_id}\n\
         **Week Period:** {} to {}\n\n\
         **WORK UPDATES THIS WEEK:**\n{days}\n\n\
         **FOLLOW-UP SESSIONS THIS WEEK:**\n{followups}\n\n\
         Generate a professional weekly report that includes:\n\n\
         {REPORT_SECTIONS}\n\n\
         Make the report professional, specific with examples, constructive, and actionable.",
        start.format("%Y-%m-%d"),
        end.format("%Y-%m-%d"),
    )
}

fn non_empty_or<'a>(text: &'a str, fallback: &'a str) -> &'a str {
    let trimmed = text.trim();
    if trimmed.is_empty() { fallback } else { trimmed }
}
