// SPDX-FileCopyrightText: 2026 Standup Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the follow-up state machine over a real SQLite store.

use std::time::Duration;

use standup_config::model::ScoringConfig;
use standup_core::types::LEAVE_PLACEHOLDER;
use standup_core::{SessionStatus, StandupError, StorageAdapter, WorkStatus};
use standup_followup::{DEFAULT_QUESTIONS, QuestionSource, SubmitOutcome};
use standup_test_utils::{MockProvider, TestHarness, submission};

const DETAILED: &str = "Completed the login form refactor today. First I wrote unit tests for \
                        the validation helpers, then I moved the API calls into a service module, \
                        and finally I deployed the branch to staging for review by the team lead.";

const GENERATED: &str = "1. Which part of the bug took longest to track down?\n\
                         2. How did you confirm the fix works?\n\
                         3. What are you picking up tomorrow?";

fn answers() -> Vec<String> {
    vec![
        "Reproduced it with a failing test first".to_string(),
        "Ran the suite and checked staging".to_string(),
        "The export feature".to_string(),
    ]
}

#[tokio::test]
async fn weak_submission_goes_through_followup_to_completion() {
    let harness = TestHarness::builder()
        .with_mock_responses(vec![GENERATED.to_string()])
        .build()
        .await
        .unwrap();
    let orch = &harness.orchestrator;
    let work = submission("intern-1", "fixed bug");
    let date = work.date;

    let outcome = orch.submit(work).await.unwrap();
    let SubmitOutcome::PendingFollowup {
        pending_id,
        quality_score,
        breakdown,
    } = outcome
    else {
        panic!("expected follow-up, got {outcome:?}");
    };
    assert!(quality_score < harness.config.scoring.threshold);
    assert_eq!(breakdown.word_count, 2);
    assert!(harness.storage.get_pending(&pending_id).await.unwrap().is_some());

    let started = orch.start_session("intern-1").await.unwrap();
    assert!(started.session_id.starts_with("intern-1_"));
    assert_eq!(started.pending_id, pending_id);
    assert_eq!(started.questions.len(), 3);
    assert_eq!(started.questions[0], "Which part of the bug took longest to track down?");
    assert_eq!(started.question_source, Some(QuestionSource::Generated));

    let completed = orch
        .complete_session("intern-1", &started.session_id, answers())
        .await
        .unwrap();
    assert!(completed.pending_removed);

    let record = harness
        .storage
        .get_daily_record("intern-1", date)
        .await
        .unwrap()
        .expect("daily record written");
    assert_eq!(record.id, completed.daily_record_id);
    assert!(record.followup_completed);
    assert!(!record.followup_skipped);
    assert_eq!(record.followup_answers, answers());
    assert_eq!(record.task, "fixed bug");
    assert_eq!(record.quality_score, Some(quality_score));

    let session = harness
        .storage
        .get_session(&started.session_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(session.status, SessionStatus::Completed);
    assert!(session.completed_at.is_some());
    assert!(harness.storage.get_pending(&pending_id).await.unwrap().is_none());
}

#[tokio::test]
async fn strong_submission_is_finalized_directly() {
    let harness = TestHarness::new().await.unwrap();
    let work = submission("intern-1", DETAILED);
    let date = work.date;

    let outcome = harness.orchestrator.submit(work).await.unwrap();
    let SubmitOutcome::Finalized {
        record_id,
        quality_score,
        ..
    } = outcome
    else {
        panic!("expected direct finalization, got {outcome:?}");
    };
    assert!(quality_score.unwrap() >= harness.config.scoring.threshold);

    let record = harness
        .storage
        .get_daily_record("intern-1", date)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(record.id, record_id);
    assert!(record.followup_skipped);
    assert!(!record.followup_completed);
    assert_eq!(harness.provider.call_count(), 0);
}

#[tokio::test]
async fn leave_skips_scoring_and_uses_placeholders() {
    let harness = TestHarness::new().await.unwrap();
    let mut work = submission("intern-1", "");
    work.status = WorkStatus::Leave;
    work.task = None;
    let date = work.date;

    let outcome = harness.orchestrator.submit(work).await.unwrap();
    assert_eq!(outcome.status_label(), "completed");
    assert!(matches!(
        outcome,
        SubmitOutcome::Finalized {
            quality_score: None,
            breakdown: None,
            ..
        }
    ));

    let record = harness
        .storage
        .get_daily_record("intern-1", date)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(record.status, WorkStatus::Leave);
    assert_eq!(record.task, LEAVE_PLACEHOLDER);
    assert_eq!(record.progress, LEAVE_PLACEHOLDER);
    assert_eq!(record.blockers, LEAVE_PLACEHOLDER);
    assert_eq!(record.quality_score, None);
    assert!(record.breakdown.is_none());
}

#[tokio::test]
async fn working_status_requires_task_text() {
    let harness = TestHarness::new().await.unwrap();
    let err = harness
        .orchestrator
        .submit(submission("intern-1", "   "))
        .await
        .unwrap_err();
    assert!(matches!(err, StandupError::Validation(_)));

    let err = harness
        .orchestrator
        .submit(submission("  ", "fixed bug"))
        .await
        .unwrap_err();
    assert!(matches!(err, StandupError::Validation(_)));
}

#[tokio::test]
async fn finalizing_twice_for_same_day_keeps_one_record() {
    let harness = TestHarness::new().await.unwrap();
    let first = submission("intern-1", DETAILED);
    let date = first.date;
    harness.orchestrator.submit(first).await.unwrap();

    let mut second = submission("intern-1", DETAILED);
    second.progress = Some("Second write".to_string());
    harness.orchestrator.submit(second).await.unwrap();

    let records = harness
        .storage
        .daily_records_between("intern-1", date, date)
        .await
        .unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].progress, "Second write");
}

#[tokio::test]
async fn start_without_pending_is_not_found() {
    let harness = TestHarness::new().await.unwrap();
    let err = harness.orchestrator.start_session("nobody").await.unwrap_err();
    assert!(matches!(err, StandupError::NotFound { .. }), "got {err}");
}

#[tokio::test]
async fn second_start_reuses_open_session() {
    let harness = TestHarness::builder()
        .with_mock_responses(vec![GENERATED.to_string()])
        .build()
        .await
        .unwrap();
    harness
        .orchestrator
        .submit(submission("intern-1", "fixed bug"))
        .await
        .unwrap();

    let first = harness.orchestrator.start_session("intern-1").await.unwrap();
    let second = harness.orchestrator.start_session("intern-1").await.unwrap();
    assert!(!first.reused);
    assert!(second.reused);
    assert_eq!(first.session_id, second.session_id);
    assert_eq!(first.questions, second.questions);
    assert_eq!(harness.provider.call_count(), 1);
}

#[tokio::test]
async fn generation_timeout_still_opens_session_with_defaults() {
    let harness = TestHarness::builder()
        .with_provider(MockProvider::new().with_latency(Duration::from_secs(5)))
        .with_generation_timeout(Duration::from_millis(50))
        .build()
        .await
        .unwrap();
    harness
        .orchestrator
        .submit(submission("intern-1", "fixed bug"))
        .await
        .unwrap();

    let started = harness.orchestrator.start_session("intern-1").await.unwrap();
    assert_eq!(started.questions, DEFAULT_QUESTIONS);
    assert!(matches!(
        started.question_source,
        Some(QuestionSource::Defaulted { .. })
    ));
    assert!(harness
        .storage
        .get_session(&started.session_id)
        .await
        .unwrap()
        .is_some());
}

#[tokio::test]
async fn wrong_answer_count_is_rejected_without_writes() {
    let harness = TestHarness::new().await.unwrap();
    let work = submission("intern-1", "fixed bug");
    let date = work.date;
    harness.orchestrator.submit(work).await.unwrap();
    let started = harness.orchestrator.start_session("intern-1").await.unwrap();

    for count in [0, 2, 4] {
        let answers = vec!["an answer".to_string(); count];
        let err = harness
            .orchestrator
            .complete_session("intern-1", &started.session_id, answers)
            .await
            .unwrap_err();
        assert!(matches!(err, StandupError::Validation(_)), "count {count}: {err}");
    }

    let blank = vec!["ok".to_string(), " ".to_string(), "ok".to_string()];
    assert!(matches!(
        harness
            .orchestrator
            .complete_session("intern-1", &started.session_id, blank)
            .await,
        Err(StandupError::Validation(_))
    ));

    assert!(harness
        .storage
        .get_daily_record("intern-1", date)
        .await
        .unwrap()
        .is_none());
    let session = harness
        .storage
        .get_session(&started.session_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(session.status, SessionStatus::Pending);
}

#[tokio::test]
async fn completing_another_owners_session_is_denied() {
    let harness = TestHarness::new().await.unwrap();
    harness
        .orchestrator
        .submit(submission("intern-1", "fixed bug"))
        .await
        .unwrap();
    let started = harness.orchestrator.start_session("intern-1").await.unwrap();

    let err = harness
        .orchestrator
        .complete_session("intern-2", &started.session_id, answers())
        .await
        .unwrap_err();
    assert!(matches!(err, StandupError::AccessDenied(_)));

    let err = harness
        .orchestrator
        .complete_session("intern-1", "intern-1_missing", answers())
        .await
        .unwrap_err();
    assert!(matches!(err, StandupError::NotFound { .. }));
}

#[tokio::test]
async fn vanished_pending_record_is_not_found_on_completion() {
    let harness = TestHarness::new().await.unwrap();
    let work = submission("intern-1", "fixed bug");
    let date = work.date;
    let SubmitOutcome::PendingFollowup { pending_id, .. } =
        harness.orchestrator.submit(work).await.unwrap()
    else {
        panic!("expected follow-up");
    };
    let started = harness.orchestrator.start_session("intern-1").await.unwrap();
    assert!(harness.storage.delete_pending(&pending_id).await.unwrap());

    let err = harness
        .orchestrator
        .complete_session("intern-1", &started.session_id, answers())
        .await
        .unwrap_err();
    assert!(matches!(err, StandupError::NotFound { .. }));
    assert!(harness
        .storage
        .get_daily_record("intern-1", date)
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn completed_session_cannot_be_completed_again() {
    let harness = TestHarness::new().await.unwrap();
    harness
        .orchestrator
        .submit(submission("intern-1", "fixed bug"))
        .await
        .unwrap();
    let started = harness.orchestrator.start_session("intern-1").await.unwrap();
    harness
        .orchestrator
        .complete_session("intern-1", &started.session_id, answers())
        .await
        .unwrap();

    let err = harness
        .orchestrator
        .complete_session("intern-1", &started.session_id, answers())
        .await
        .unwrap_err();
    assert!(matches!(err, StandupError::Validation(_)));
}

#[tokio::test]
async fn completion_retry_after_failed_daily_write_finalizes() {
    let harness = TestHarness::new().await.unwrap();
    let work = submission("intern-1", "fixed bug");
    let date = work.date;
    let SubmitOutcome::PendingFollowup { pending_id, .. } =
        harness.orchestrator.submit(work).await.unwrap()
    else {
        panic!("expected follow-up");
    };
    let started = harness.orchestrator.start_session("intern-1").await.unwrap();

    harness.faults.fail_next_daily_writes(1);
    let err = harness
        .orchestrator
        .complete_session("intern-1", &started.session_id, answers())
        .await
        .unwrap_err();
    assert!(matches!(err, StandupError::Storage { .. }));

    let session = harness.storage.get_session(&started.session_id).await.unwrap().unwrap();
    assert_eq!(session.status, SessionStatus::Completed);
    assert!(harness.storage.get_daily_record("intern-1", date).await.unwrap().is_none());
    assert!(harness.storage.get_pending(&pending_id).await.unwrap().is_some());

    let done = harness
        .orchestrator
        .complete_session("intern-1", &started.session_id, answers())
        .await
        .unwrap();
    assert!(done.pending_removed);

    let record = harness.storage.get_daily_record("intern-1", date).await.unwrap().unwrap();
    assert!(record.followup_completed);
    assert_eq!(record.followup_answers, answers());
    assert!(harness.storage.get_pending(&pending_id).await.unwrap().is_none());

    let err = harness
        .orchestrator
        .complete_session("intern-1", &started.session_id, answers())
        .await
        .unwrap_err();
    assert!(matches!(err, StandupError::Validation(_)));
}

#[tokio::test]
async fn interrupted_completion_keeps_the_recorded_answers() {
    let harness = TestHarness::new().await.unwrap();
    let work = submission("intern-1", "fixed bug");
    let date = work.date;
    harness.orchestrator.submit(work).await.unwrap();
    let started = harness.orchestrator.start_session("intern-1").await.unwrap();

    // Session marked completed, nothing after it written.
    assert!(harness
        .storage
        .complete_session(&started.session_id, &answers(), chrono::Utc::now())
        .await
        .unwrap());

    let retry = vec!["one".to_string(), "two".to_string(), "three".to_string()];
    harness
        .orchestrator
        .complete_session("intern-1", &started.session_id, retry)
        .await
        .unwrap();

    let record = harness.storage.get_daily_record("intern-1", date).await.unwrap().unwrap();
    assert_eq!(record.followup_answers, answers());
}

#[tokio::test]
async fn scoring_failure_routes_detailed_work_to_followup() {
    let harness = TestHarness::builder()
        .with_scoring(ScoringConfig {
            negative_sentiment: f64::NAN,
            ..ScoringConfig::default()
        })
        .build()
        .await
        .unwrap();

    let outcome = harness.orchestrator.submit(submission("intern-1", DETAILED)).await.unwrap();
    let SubmitOutcome::PendingFollowup {
        pending_id,
        quality_score,
        breakdown,
    } = outcome
    else {
        panic!("expected follow-up, got {outcome:?}");
    };
    assert_eq!(quality_score, 0.0);
    assert!(breakdown.error.is_some());

    let staged = harness.storage.get_pending(&pending_id).await.unwrap().unwrap();
    let stored = staged.breakdown.expect("breakdown kept on the staged record");
    assert!(stored.error.as_deref().is_some_and(|e| e.contains("negative_sentiment")));
    assert!(stored.flagged);

    let started = harness.orchestrator.start_session("intern-1").await.unwrap();
    assert_eq!(started.pending_id, pending_id);
}

#[tokio::test]
async fn analyze_persists_nothing() {
    let harness = TestHarness::new().await.unwrap();
    let analysis = harness
        .orchestrator
        .analyze("intern-1", "fixed bug")
        .await
        .unwrap();
    assert!(analysis.needs_followup);
    assert_eq!(analysis.recommendation, "Follow-up recommended");
    assert_eq!(analysis.threshold, 6.0);

    let good = harness.orchestrator.analyze("intern-1", DETAILED).await.unwrap();
    assert_eq!(good.recommendation, "Good quality");

    let stats = harness.storage.stats().await.unwrap();
    assert_eq!(stats.pending_updates + stats.daily_records, 0);
}

#[tokio::test]
async fn sessions_are_listed_newest_first() {
    let harness = TestHarness::new().await.unwrap();
    harness
        .orchestrator
        .submit(submission("intern-1", "fixed bug"))
        .await
        .unwrap();
    let started = harness.orchestrator.start_session("intern-1").await.unwrap();

    let sessions = harness.orchestrator.list_sessions("intern-1", 50).await.unwrap();
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0].id, started.session_id);
    assert!(harness
        .orchestrator
        .list_sessions("intern-2", 50)
        .await
        .unwrap()
        .is_empty());
}
