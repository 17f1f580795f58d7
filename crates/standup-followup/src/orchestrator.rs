// SPDX-FileCopyrightText: 2026 Standup Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Follow-up state machine.
//!
//! Per owner and day a submission moves `NEW -> FINALIZED_DIRECT` when it
//! scores well (or is a leave day), or `NEW -> PENDING_FOLLOWUP ->
//! SESSION_OPEN -> FINALIZED_WITH_FOLLOWUP` when it does not. Finalizing
//! always replaces the daily record for that owner and day.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use standup_config::model::FollowupConfig;
use standup_core::types::LEAVE_PLACEHOLDER;
use standup_core::{
    DailyRecord, FollowupSession, PendingRecord, QualityBreakdown, SessionStatus, StandupError,
    StorageAdapter, Submission, WorkStatus,
};
use tracing::{debug, info, warn};

use crate::history::{self, HistoryItem};
use crate::questions::{QuestionContext, QuestionGenerator, QuestionSource};
use crate::scorer::QualityScorer;

/// Result of [`FollowupOrchestrator::submit`].
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Written straight to the daily record.
    Finalized {
        record_id: String,
        /// `None` for leave days, which are never scored.
        quality_score: Option<f64>,
        breakdown: Option<QualityBreakdown>,
    },
    /// Staged; the caller must start a follow-up session next.
    PendingFollowup {
        pending_id: String,
        quality_score: f64,
        breakdown: QualityBreakdown,
    },
}

impl SubmitOutcome {
    pub fn status_label(&self) -> &'static str {
        match self {
            Self::Finalized { .. } => "completed",
            Self::PendingFollowup { .. } => "pending_followup",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StartedSession {
    pub session_id: String,
    pub pending_id: String,
    pub questions: Vec<String>,
    /// True when an open session for the same pending record was returned.
    pub reused: bool,
    /// `None` for a reused session.
    pub question_source: Option<QuestionSource>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompletedSession {
    pub session_id: String,
    pub daily_record_id: String,
    /// False when the staged record could not be removed; the reconciler sweeps it later.
    pub pending_removed: bool,
}

/// Result of [`FollowupOrchestrator::analyze`]. Nothing is persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    pub needs_followup: bool,
    pub breakdown: QualityBreakdown,
    pub recommendation: &'static str,
    pub threshold: f64,
}

/// Drives submissions through scoring, staging, follow-up and finalization.
pub struct FollowupOrchestrator {
    storage: Arc<dyn StorageAdapter>,
    scorer: QualityScorer,
    generator: QuestionGenerator,
    config: FollowupConfig,
}

impl FollowupOrchestrator {
    pub fn new(
        storage: Arc<dyn StorageAdapter>,
        scorer: QualityScorer,
        generator: QuestionGenerator,
        config: FollowupConfig,
    ) -> Self {
        Self {
            storage,
            scorer,
            generator,
            config,
        }
    }

    pub fn scorer(&self) -> &QualityScorer {
        &self.scorer
    }

    pub async fn submit(&self, submission: Submission) -> Result<SubmitOutcome, StandupError> {
        let owner_id = owner(&submission.owner_id)?.to_string();
        let owner_id = owner_id.as_str();

        if submission.status == WorkStatus::Leave {
            return self.finalize_leave(owner_id, submission).await;
        }

        let task = submission.task_text().trim().to_string();
        if task.is_empty() {
            return Err(StandupError::Validation(
                "Task required for working/remote status".into(),
            ));
        }

        let now = Utc::now();
        let recent = self.history(owner_id, None, now).await?;
        let (needs_followup, breakdown) = self.score_failsafe(owner_id, &task, &recent);
        let quality_score = breakdown.quality_score;

        if !needs_followup {
            let record = DailyRecord {
                id: new_id(),
                owner_id: owner_id.to_string(),
                date: submission.date,
                stack: submission.stack,
                task,
                progress: submission.progress.unwrap_or_default(),
                blockers: submission.blockers.unwrap_or_default(),
                status: submission.status,
                quality_score: Some(quality_score),
                followup_skipped: true,
                followup_completed: false,
                followup_answers: Vec::new(),
                breakdown: Some(breakdown.clone()),
            };
            let record_id = self.storage.upsert_daily_record(&record).await?;
            info!(owner = %owner_id, date = %record.date, score = quality_score, "submission finalized without follow-up");
            return Ok(SubmitOutcome::Finalized {
                record_id,
                quality_score: Some(quality_score),
                breakdown: Some(breakdown),
            });
        }

        let pending = PendingRecord {
            id: new_id(),
            owner_id: owner_id.to_string(),
            date: submission.date,
            stack: submission.stack,
            task,
            progress: submission.progress.unwrap_or_default(),
            blockers: submission.blockers.unwrap_or_default(),
            status: submission.status,
            quality_score,
            breakdown: Some(breakdown.clone()),
            submitted_at: now,
            followup_completed: false,
        };
        self.storage.insert_pending(&pending).await?;
        info!(owner = %owner_id, pending_id = %pending.id, score = quality_score, "submission staged for follow-up");

        Ok(SubmitOutcome::PendingFollowup {
            pending_id: pending.id,
            quality_score,
            breakdown,
        })
    }

    /// Opens a follow-up session for the owner's most recent unresolved submission.
    ///
    /// An already-open session for that submission is returned as is.
    pub async fn start_session(&self, owner_id: &str) -> Result<StartedSession, StandupError> {
        let owner_id = owner(owner_id)?;
        let pending = self
            .storage
            .latest_unresolved_pending(owner_id)
            .await?
            .ok_or_else(|| StandupError::not_found("pending work update", owner_id))?;

        if let Some(open) = self.storage.open_session_for_pending(&pending.id).await? {
            debug!(owner = %owner_id, session_id = %open.id, "reusing open follow-up session");
            return Ok(StartedSession {
                session_id: open.id,
                pending_id: pending.id,
                questions: open.questions,
                reused: true,
                question_source: None,
            });
        }

        let now = Utc::now();
        let recent = self.history(owner_id, Some(&pending.id), now).await?;
        let (_, rescored) = self.score_failsafe(owner_id, &pending.task, &recent);
        debug!(owner = %owner_id, pending_id = %pending.id, score = rescored.quality_score, "rescored staged submission");

        let ctx = QuestionContext {
            task: &pending.task,
            challenges: &pending.progress,
            history: &recent,
            today: now.date_naive(),
        };
        let set = self.generator.generate(owner_id, &ctx).await;
        let source = set.source().clone();

        let session = FollowupSession::open(
            session_id(owner_id),
            owner_id.to_string(),
            pending.id.clone(),
            pending.date,
            set.into_vec(),
            now,
        );
        self.storage.insert_session(&session).await?;
        info!(owner = %owner_id, session_id = %session.id, pending_id = %pending.id, "follow-up session opened");

        Ok(StartedSession {
            session_id: session.id,
            pending_id: pending.id,
            questions: session.questions,
            reused: false,
            question_source: Some(source),
        })
    }

    /// Records the answers, finalizes the daily record and drops the staged record.
    pub async fn complete_session(
        &self,
        owner_id: &str,
        session_id: &str,
        answers: Vec<String>,
    ) -> Result<CompletedSession, StandupError> {
        if answers.len() != self.config.required_answers {
            return Err(StandupError::Validation(format!(
                "Need exactly {} answers",
                self.config.required_answers
            )));
        }
        let answers: Vec<String> = answers.into_iter().map(|a| a.trim().to_string()).collect();
        if answers.iter().any(String::is_empty) {
            return Err(StandupError::Validation("Answers must not be empty".into()));
        }
        let owner_id = owner(owner_id)?;

        let session = self
            .storage
            .get_session(session_id)
            .await?
            .ok_or_else(|| StandupError::not_found("session", session_id))?;
        if session.owner_id != owner_id {
            warn!(owner = %owner_id, session_id, "session owned by another user");
            return Err(StandupError::AccessDenied(format!(
                "session {session_id} belongs to another user"
            )));
        }
        let already_completed = session.status == SessionStatus::Completed;
        let pending = match self.storage.get_pending(&session.pending_id).await? {
            Some(pending) => pending,
            None if already_completed => {
                return Err(StandupError::Validation("Session already completed".into()));
            }
            None => {
                return Err(StandupError::not_found("pending work update", &session.pending_id));
            }
        };

        // A completed session whose staged record survives is an interrupted
        // completion: keep the recorded answers and finish the remaining writes.
        let answers = if already_completed {
            info!(owner = %owner_id, session_id, "resuming interrupted follow-up completion");
            if session.answers.iter().all(|a| !a.trim().is_empty()) {
                session.answers
            } else {
                answers
            }
        } else {
            if !self.storage.complete_session(session_id, &answers, Utc::now()).await? {
                return Err(StandupError::not_found("session", session_id));
            }
            answers
        };

        let record = DailyRecord {
            id: new_id(),
            owner_id: owner_id.to_string(),
            date: pending.date,
            stack: pending.stack,
            task: pending.task,
            progress: pending.progress,
            blockers: pending.blockers,
            status: pending.status,
            quality_score: Some(pending.quality_score),
            followup_skipped: false,
            followup_completed: true,
            followup_answers: answers,
            breakdown: pending.breakdown,
        };
        let daily_record_id = self.storage.upsert_daily_record(&record).await?;

        let pending_removed = match self.storage.delete_pending(&pending.id).await {
            Ok(removed) => removed,
            Err(e) => {
                warn!(pending_id = %pending.id, error = %e, "failed to remove staged record; leaving it for the reconciler");
                false
            }
        };
        info!(owner = %owner_id, session_id, date = %record.date, "follow-up completed");

        Ok(CompletedSession {
            session_id: session_id.to_string(),
            daily_record_id,
            pending_removed,
        })
    }

    /// Scores `text` against the owner's history without persisting anything.
    pub async fn analyze(&self, owner_id: &str, text: &str) -> Result<Analysis, StandupError> {
        let owner_id = owner(owner_id)?;
        let recent = self.history(owner_id, None, Utc::now()).await?;
        let texts: Vec<&str> = recent.iter().map(|h| h.task.as_str()).collect();
        let outcome = self.scorer.score(text, &texts)?;
        Ok(Analysis {
            needs_followup: outcome.needs_followup,
            recommendation: if outcome.needs_followup {
                "Follow-up recommended"
            } else {
                "Good quality"
            },
            breakdown: outcome.breakdown,
            threshold: self.scorer.threshold(),
        })
    }

    /// The owner's sessions, newest first.
    pub async fn list_sessions(
        &self,
        owner_id: &str,
        limit: usize,
    ) -> Result<Vec<FollowupSession>, StandupError> {
        let owner_id = owner(owner_id)?;
        self.storage.list_sessions(owner_id, limit).await
    }

    async fn finalize_leave(
        &self,
        owner_id: &str,
        submission: Submission,
    ) -> Result<SubmitOutcome, StandupError> {
        let task = submission
            .task
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| LEAVE_PLACEHOLDER.to_string());
        let record = DailyRecord {
            id: new_id(),
            owner_id: owner_id.to_string(),
            date: submission.date,
            stack: submission.stack,
            task,
            progress: LEAVE_PLACEHOLDER.to_string(),
            blockers: LEAVE_PLACEHOLDER.to_string(),
            status: WorkStatus::Leave,
            quality_score: None,
            followup_skipped: false,
            followup_completed: false,
            followup_answers: Vec::new(),
            breakdown: None,
        };
        let record_id = self.storage.upsert_daily_record(&record).await?;
        info!(owner = %owner_id, date = %record.date, "leave day recorded");
        Ok(SubmitOutcome::Finalized {
            record_id,
            quality_score: None,
            breakdown: None,
        })
    }

    async fn history(
        &self,
        owner_id: &str,
        exclude_pending: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Vec<HistoryItem>, StandupError> {
        history::gather(
            self.storage.as_ref(),
            owner_id,
            exclude_pending,
            now,
            &self.config,
        )
        .await
    }

    /// A scorer failure counts as needing follow-up.
    fn score_failsafe(
        &self,
        owner_id: &str,
        text: &str,
        recent: &[HistoryItem],
    ) -> (bool, QualityBreakdown) {
        let texts: Vec<&str> = recent.iter().map(|h| h.task.as_str()).collect();
        match self.scorer.score(text, &texts) {
            Ok(outcome) => (outcome.needs_followup, outcome.breakdown),
            Err(e) => {
                warn!(owner = %owner_id, error = %e, "scoring failed; routing to follow-up");
                (true, QualityBreakdown::failed(e.to_string()))
            }
        }
    }
}

fn owner(raw: &str) -> Result<&str, StandupError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(StandupError::Validation("user_id is required".into()));
    }
    Ok(trimmed)
}

fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

fn session_id(owner_id: &str) -> String {
    format!("{owner_id}_{}", uuid::Uuid::new_v4().simple())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn owner_is_trimmed_and_required() {
        assert_eq!(owner("  intern-7 ").unwrap(), "intern-7");
        assert!(matches!(owner("   "), Err(StandupError::Validation(_))));
    }

    #[test]
    fn session_ids_are_prefixed_by_owner() {
        let id = session_id("u1");
        assert!(id.starts_with("u1_"));
        assert_eq!(id.len(), "u1_".len() + 32);
        assert_ne!(session_id("u1"), id);
    }

    #[test]
    fn outcome_labels_match_states() {
        let done = SubmitOutcome::Finalized {
            record_id: "r".into(),
            quality_score: None,
            breakdown: None,
        };
        assert_eq!(done.status_label(), "completed");
        let staged = SubmitOutcome::PendingFollowup {
            pending_id: "p".into(),
            quality_score: 2.0,
            breakdown: QualityBreakdown::failed("x"),
        };
        assert_eq!(staged.status_label(), "pending_followup");
    }
}
