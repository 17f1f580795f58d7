// SPDX-FileCopyrightText: 2026 Standup Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Recent work history for an owner, merged from finalized daily records
//! and staged pending records, plus the text blocks built from it.

use std::cmp::Reverse;

use chrono::{DateTime, Days, Duration, NaiveDate, Utc};
use standup_config::model::FollowupConfig;
use standup_core::{DailyRecord, PendingRecord, StandupError, StorageAdapter};
use tracing::debug;

const NO_PLANS: &str = "No previous plans found";
const NO_CHALLENGES: &str = "No challenges mentioned";
const CHALLENGES_PREFIX: &str = "Challenges Today:";

/// One past submission as seen by question generation.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryItem {
    pub submitted_at: Option<DateTime<Utc>>,
    pub timestamp: Option<DateTime<Utc>>,
    pub date: Option<NaiveDate>,
    pub task: String,
    /// Progress notes; rendered as challenges.
    pub progress: String,
    /// Blockers; rendered as plans.
    pub blockers: String,
}

impl HistoryItem {
    /// Submission time, else generic timestamp, else noon on the date.
    /// `None` means undated.
    pub fn effective_timestamp(&self) -> Option<DateTime<Utc>> {
        self.submitted_at.or(self.timestamp).or_else(|| {
            self.date
                .and_then(|d| d.and_hms_opt(12, 0, 0))
                .map(|noon| noon.and_utc())
        })
    }

    fn day(&self) -> Option<NaiveDate> {
        self.effective_timestamp().map(|ts| ts.date_naive())
    }
}

impl From<&DailyRecord> for HistoryItem {
    fn from(record: &DailyRecord) -> Self {
        Self {
            submitted_at: None,
            timestamp: None,
            date: Some(record.date),
            task: record.task.clone(),
            progress: record.progress.clone(),
            blockers: record.blockers.clone(),
        }
    }
}

impl From<&PendingRecord> for HistoryItem {
    fn from(record: &PendingRecord) -> Self {
        Self {
            submitted_at: Some(record.submitted_at),
            timestamp: None,
            date: Some(record.date),
            task: record.task.clone(),
            progress: record.progress.clone(),
            blockers: record.blockers.clone(),
        }
    }
}

/// Collects the owner's history inside the configured window.
///
/// `exclude_pending` keeps the submission being followed up out of its own history.
pub async fn gather(
    storage: &dyn StorageAdapter,
    owner_id: &str,
    exclude_pending: Option<&str>,
    now: DateTime<Utc>,
    config: &FollowupConfig,
) -> Result<Vec<HistoryItem>, StandupError> {
    let window = Duration::days(i64::from(config.history_window_days));
    let today = now.date_naive();
    let since = today
        .checked_sub_days(Days::new(u64::from(config.history_window_days)))
        .unwrap_or(today);
    let until = today.checked_add_days(Days::new(366)).unwrap_or(today);

    let daily = storage.daily_records_between(owner_id, since, until).await?;
    let pending = storage.list_pending(owner_id).await?;

    let mut items: Vec<HistoryItem> = daily.iter().map(HistoryItem::from).collect();
    items.extend(
        pending
            .iter()
            .filter(|p| Some(p.id.as_str()) != exclude_pending)
            .map(HistoryItem::from)
            .filter(|item| item.effective_timestamp().is_some_and(|ts| ts > now - window)),
    );

    let merged = merge(items, config.max_history_items);
    debug!(owner = %owner_id, items = merged.len(), "gathered work history");
    Ok(merged)
}

/// Sorts newest first with undated items last and truncates to `max_items`.
///
/// Every item is kept: a finalized record and a staged one from the same
/// day are separate submissions and both count as recent work.
pub fn merge(mut items: Vec<HistoryItem>, max_items: usize) -> Vec<HistoryItem> {
    items.sort_by_key(|item| Reverse(item.effective_timestamp()));
    items.truncate(max_items);
    items
}

/// Block describing the submission being followed up.
pub fn current_context(task: &str, challenges: &str) -> String {
    let mut lines = vec!["CURRENT WORK UPDATE:".to_string()];
    let task = task.trim();
    if !task.is_empty() {
        lines.push(format!("Work Description: {task}"));
    }
    let challenges = challenges.trim();
    if !challenges.is_empty() {
        lines.push(format!("{CHALLENGES_PREFIX} {challenges}"));
    }
    lines.push("---".to_string());
    lines.join("\n")
}

/// Block listing past submissions, one `---`-terminated entry each.
pub fn history_context(items: &[HistoryItem]) -> String {
    let mut lines = vec!["RECENT WORK HISTORY:".to_string()];
    for item in items {
        let date = item
            .day()
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "Unknown".to_string());
        lines.push(format!("Date: {date}"));
        for (label, text) in [
            ("Work", &item.task),
            ("Challenges", &item.progress),
            ("Plans", &item.blockers),
        ] {
            let text = text.trim();
            if !text.is_empty() {
                lines.push(format!("{label}: {text}"));
            }
        }
        lines.push("---".to_string());
    }
    lines.join("\n")
}

/// Plans recorded yesterday, else the most recent plans from a day other than today.
pub fn yesterday_plans(items: &[HistoryItem], today: NaiveDate) -> String {
    let yesterday = today.pred_opt();
    let plans_of = |item: &HistoryItem| {
        let plans = item.blockers.trim();
        (!plans.is_empty()).then(|| plans.to_string())
    };

    items
        .iter()
        .filter(|item| item.day().is_some() && item.day() == yesterday)
        .find_map(plans_of)
        .or_else(|| {
            items
                .iter()
                .filter(|item| item.day() != Some(today))
                .find_map(plans_of)
        })
        .unwrap_or_else(|| NO_PLANS.to_string())
}

/// The challenges line of a [`current_context`] block.
pub fn current_challenges(context: &str) -> String {
    context
        .lines()
        .map(str::trim)
        .find_map(|line| line.strip_prefix(CHALLENGES_PREFIX))
        .map(|rest| rest.trim().to_string())
        .unwrap_or_else(|| NO_CHALLENGES.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, d).unwrap()
    }

    fn dated(d: u32, task: &str, plans: &str) -> HistoryItem {
        HistoryItem {
            submitted_at: None,
            timestamp: None,
            date: Some(day(d)),
            task: task.into(),
            progress: String::new(),
            blockers: plans.into(),
        }
    }

    #[test]
    fn timestamp_prefers_submission_then_generic_then_noon() {
        let submitted = Utc.with_ymd_and_hms(2026, 3, 4, 8, 30, 0).unwrap();
        let generic = Utc.with_ymd_and_hms(2026, 3, 4, 9, 0, 0).unwrap();
        let mut item = dated(4, "x", "");
        assert_eq!(
            item.effective_timestamp(),
            Some(Utc.with_ymd_and_hms(2026, 3, 4, 12, 0, 0).unwrap())
        );
        item.timestamp = Some(generic);
        assert_eq!(item.effective_timestamp(), Some(generic));
        item.submitted_at = Some(submitted);
        assert_eq!(item.effective_timestamp(), Some(submitted));

        item.submitted_at = None;
        item.timestamp = None;
        item.date = None;
        assert_eq!(item.effective_timestamp(), None);
    }

    #[test]
    fn merge_sorts_newest_first_keeps_undated_and_truncates() {
        let mut undated = dated(1, "undated", "");
        undated.date = None;
        let items = vec![dated(2, "b", ""), undated, dated(5, "e", ""), dated(3, "c", "")];

        let merged = merge(items.clone(), 10);
        let tasks: Vec<_> = merged.iter().map(|i| i.task.as_str()).collect();
        assert_eq!(tasks, vec!["e", "c", "b", "undated"]);

        assert_eq!(merge(items, 2).len(), 2);
    }

    #[test]
    fn merge_keeps_every_item_from_the_same_day() {
        let mut later = dated(3, "resubmitted", "");
        later.submitted_at = Some(Utc.with_ymd_and_hms(2026, 3, 3, 17, 0, 0).unwrap());
        let merged = merge(vec![dated(3, "finalized", ""), later, dated(2, "before", "")], 10);
        let tasks: Vec<_> = merged.iter().map(|i| i.task.as_str()).collect();
        assert_eq!(tasks, vec!["resubmitted", "finalized", "before"]);
    }

    #[test]
    fn context_blocks_have_expected_shape() {
        let current = current_context("Built the login page", "CSS grid confusion");
        assert_eq!(
            current,
            "CURRENT WORK UPDATE:\nWork Description: Built the login page\n\
             Challenges Today: CSS grid confusion\n---"
        );
        assert_eq!(current_context("x", "  "), "CURRENT WORK UPDATE:\nWork Description: x\n---");

        let mut undated = dated(1, "old work", "");
        undated.date = None;
        let history = history_context(&[dated(2, "api", "write docs"), undated]);
        assert_eq!(
            history,
            "RECENT WORK HISTORY:\nDate: 2026-03-02\nWork: api\nPlans: write docs\n---\n\
             Date: Unknown\nWork: old work\n---"
        );
    }

    #[test]
    fn challenges_are_read_back_from_context() {
        assert_eq!(current_challenges(&current_context("t", "flaky CI")), "flaky CI");
        assert_eq!(current_challenges(&current_context("t", "")), NO_CHALLENGES);
    }

    #[test]
    fn yesterday_plans_fall_back_to_latest_non_today() {
        let today = day(10);
        let items = vec![
            dated(10, "today", "today plans"),
            dated(9, "yesterday", "ship the form"),
            dated(7, "older", "older plans"),
        ];
        assert_eq!(yesterday_plans(&items, today), "ship the form");

        let items = vec![dated(10, "today", "today plans"), dated(7, "older", "older plans")];
        assert_eq!(yesterday_plans(&items, today), "older plans");

        assert_eq!(yesterday_plans(&[dated(10, "t", "p")], today), NO_PLANS);
        assert_eq!(yesterday_plans(&[], today), NO_PLANS);
    }
}
