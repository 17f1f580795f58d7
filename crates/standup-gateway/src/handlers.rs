// SPDX-FileCopyrightText: 2026 Standup Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers for the gateway REST API.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use standup_core::{
    ConnectionProbe, FollowupSession, HealthStatus, PluginAdapter, ProviderAdapter,
    QualityBreakdown, SentimentLabel, SessionStatus, StandupError, StorageAdapter, StoreStats,
    Submission, WorkStatus,
};
use standup_followup::{Report, ReportSummary, SubmitOutcome};

use crate::error::ApiError;
use crate::server::GatewayState;

/// Sessions returned by the list route when no `limit` is given.
pub const DEFAULT_LIST_LIMIT: usize = 50;

const DATE_FORMAT: &str = "%Y-%m-%d";

// --- Request bodies ---

/// Request body for POST /api/work-updates.
#[derive(Debug, Deserialize)]
pub struct WorkUpdateRequest {
    pub user_id: String,
    pub status: WorkStatus,
    /// Category tag (for example `frontend`).
    #[serde(default)]
    pub stack: String,
    #[serde(default)]
    pub task: Option<String>,
    #[serde(default)]
    pub progress: Option<String>,
    #[serde(default)]
    pub blockers: Option<String>,
    /// Defaults to the current UTC day.
    #[serde(default)]
    pub date: Option<NaiveDate>,
}

/// Request body naming only the owner (start and list routes).
#[derive(Debug, Deserialize)]
pub struct OwnerRequest {
    pub user_id: String,
}

/// Request body for PUT /api/followup/{session_id}/complete.
#[derive(Debug, Deserialize)]
pub struct CompleteFollowupRequest {
    pub user_id: String,
    pub answers: Vec<String>,
}

/// Request body for POST /api/quality/analyze.
#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub user_id: String,
    pub work_description: String,
}

/// Request body for POST /api/reports/weekly. Dates are `YYYY-MM-DD`.
#[derive(Debug, Deserialize)]
pub struct WeeklyReportRequest {
    pub user_id: String,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub limit: Option<usize>,
}

// --- Response bodies ---

#[derive(Debug, Serialize)]
pub struct BannerResponse {
    pub message: String,
    pub version: String,
    pub ai_provider: String,
    pub server_url: String,
}

/// Response body for GET /health.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// `healthy`, `degraded` or `unhealthy`.
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database: Option<&'static str>,
    /// `connected` or `offline`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_url: Option<String>,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Response body for POST /api/work-updates.
#[derive(Debug, Serialize)]
pub struct WorkUpdateResponse {
    pub success: bool,
    pub message: String,
    pub user_id: String,
    #[serde(rename = "recordId", skip_serializing_if = "Option::is_none")]
    pub record_id: Option<String>,
    #[serde(rename = "tempWorkUpdateId", skip_serializing_if = "Option::is_none")]
    pub temp_work_update_id: Option<String>,
    #[serde(rename = "redirectToFollowup")]
    pub redirect_to_followup: bool,
    #[serde(rename = "qualityScore", skip_serializing_if = "Option::is_none")]
    pub quality_score: Option<f64>,
    /// `completed` or `pending_followup`.
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
pub struct StartFollowupResponse {
    pub success: bool,
    pub message: &'static str,
    pub user_id: String,
    #[serde(rename = "sessionId")]
    pub session_id: String,
    pub questions: Vec<String>,
    /// True when an already-open session was returned.
    pub reused: bool,
}

#[derive(Debug, Serialize)]
pub struct CompleteFollowupResponse {
    pub success: bool,
    pub message: &'static str,
    pub user_id: String,
    #[serde(rename = "sessionId")]
    pub session_id: String,
    #[serde(rename = "dailyRecordId")]
    pub daily_record_id: String,
    pub status: &'static str,
}

/// Per-signal view of a [`QualityBreakdown`].
#[derive(Debug, Serialize)]
pub struct AnalysisDetails {
    pub word_count: usize,
    pub keyword_found: bool,
    pub sentiment_label: SentimentLabel,
    pub sentiment_polarity: f64,
    pub is_repetition: bool,
    pub has_structure: bool,
    pub flagged: bool,
    pub flag_reasons: Vec<String>,
}

impl From<&QualityBreakdown> for AnalysisDetails {
    fn from(b: &QualityBreakdown) -> Self {
        Self {
            word_count: b.word_count,
            keyword_found: b.keyword_found,
            sentiment_label: b.sentiment_label,
            sentiment_polarity: b.sentiment_polarity,
            is_repetition: b.is_repetition,
            has_structure: b.has_structure,
            flagged: b.flagged,
            flag_reasons: b.flag_reasons.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub user_id: String,
    pub quality_score: f64,
    pub needs_followup: bool,
    pub analysis: AnalysisDetails,
    pub recommendation: &'static str,
    pub threshold: f64,
}

#[derive(Debug, Serialize)]
pub struct DateRange {
    pub start: String,
    pub end: String,
}

#[derive(Debug, Serialize)]
pub struct ReportMetadata {
    pub user_id: String,
    pub date_range: DateRange,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_summary: Option<ReportSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generated_at: Option<DateTime<Utc>>,
}

/// Response body for POST /api/reports/weekly.
///
/// `success` is false (with `message`) when the range holds no records.
#[derive(Debug, Serialize)]
pub struct WeeklyReportResponse {
    pub success: bool,
    pub user_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub metadata: ReportMetadata,
}

/// A stored session as listed to clients.
#[derive(Debug, Serialize)]
pub struct SessionView {
    #[serde(rename = "sessionId")]
    pub session_id: String,
    pub user_id: String,
    #[serde(rename = "tempWorkUpdateId")]
    pub pending_id: String,
    pub session_date: NaiveDate,
    pub questions: Vec<String>,
    pub answers: Vec<String>,
    pub status: SessionStatus,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl From<FollowupSession> for SessionView {
    fn from(s: FollowupSession) -> Self {
        Self {
            session_id: s.id,
            user_id: s.owner_id,
            pending_id: s.pending_id,
            session_date: s.session_date,
            questions: s.questions,
            answers: s.answers,
            status: s.status,
            created_at: s.created_at,
            completed_at: s.completed_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ListSessionsResponse {
    pub success: bool,
    pub user_id: String,
    pub sessions: Vec<SessionView>,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct ConnectivityResults {
    pub timestamp: DateTime<Utc>,
    pub test_results: ConnectionProbe,
    pub provider: String,
    pub server_url: String,
}

#[derive(Debug, Serialize)]
pub struct ConnectivityResponse {
    pub success: bool,
    pub message: &'static str,
    pub test_results: ConnectivityResults,
}

#[derive(Debug, Serialize)]
pub struct ProviderStatus {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub name: String,
    /// `connected` or `offline`.
    pub status: &'static str,
}

/// Response body for GET /stats.
#[derive(Debug, Serialize)]
pub struct StatsResponse {
    #[serde(flatten)]
    pub store: StoreStats,
    pub uptime_secs: u64,
    pub ai_provider: ProviderStatus,
}

// --- Handlers ---

/// GET /
pub async fn get_root(State(state): State<GatewayState>) -> Json<BannerResponse> {
    Json(BannerResponse {
        message: state.service_name.clone(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        ai_provider: state.provider.name().to_string(),
        server_url: state.provider.server_url().to_string(),
    })
}

/// GET /health
///
/// Pings the store, then probes the provider. A store failure is
/// `unhealthy`; an offline provider only `degraded`.
pub async fn get_health(State(state): State<GatewayState>) -> Json<HealthResponse> {
    let store_error = match state.storage.health_check().await {
        Ok(HealthStatus::Healthy) => None,
        Ok(HealthStatus::Degraded(reason)) | Ok(HealthStatus::Unhealthy(reason)) => Some(reason),
        Err(e) => Some(e.to_string()),
    };
    if let Some(error) = store_error {
        return Json(HealthResponse {
            status: "unhealthy",
            database: None,
            provider: None,
            provider_url: None,
            timestamp: Utc::now(),
            error: Some(error),
        });
    }

    let probe = state.provider.test_connection().await;
    let working = probe.is_working();
    Json(HealthResponse {
        status: if working { "healthy" } else { "degraded" },
        database: Some("connected"),
        provider: Some(connection_label(working)),
        provider_url: Some(probe.server_url),
        timestamp: Utc::now(),
        error: None,
    })
}

/// POST /api/work-updates
pub async fn post_work_update(
    State(state): State<GatewayState>,
    Json(body): Json<WorkUpdateRequest>,
) -> Result<Json<WorkUpdateResponse>, ApiError> {
    let user_id = body.user_id.trim().to_string();
    let submission = Submission {
        owner_id: user_id.clone(),
        status: body.status,
        stack: body.stack,
        task: body.task,
        progress: body.progress,
        blockers: body.blockers,
        date: body.date.unwrap_or_else(|| Utc::now().date_naive()),
    };

    let outcome = state.orchestrator.submit(submission).await?;
    let status = outcome.status_label();
    let response = match outcome {
        SubmitOutcome::Finalized {
            record_id,
            quality_score,
            ..
        } => WorkUpdateResponse {
            success: true,
            message: match quality_score {
                Some(score) => {
                    format!("High quality (Score: {score:.1}/10) - No follow-up needed")
                }
                None => "Leave status saved".to_string(),
            },
            user_id,
            record_id: Some(record_id),
            temp_work_update_id: None,
            redirect_to_followup: false,
            quality_score,
            status,
        },
        SubmitOutcome::PendingFollowup {
            pending_id,
            quality_score,
            ..
        } => WorkUpdateResponse {
            success: true,
            message: format!("Requires follow-up (Score: {quality_score:.1}/10)"),
            user_id,
            record_id: None,
            temp_work_update_id: Some(pending_id),
            redirect_to_followup: true,
            quality_score: Some(quality_score),
            status,
        },
    };
    Ok(Json(response))
}

/// POST /api/followups/start
pub async fn post_start_followup(
    State(state): State<GatewayState>,
    Json(body): Json<OwnerRequest>,
) -> Result<Json<StartFollowupResponse>, ApiError> {
    let started = state.orchestrator.start_session(&body.user_id).await?;
    Ok(Json(StartFollowupResponse {
        success: true,
        message: "Follow-up session started",
        user_id: body.user_id.trim().to_string(),
        session_id: started.session_id,
        questions: started.questions,
        reused: started.reused,
    }))
}

/// PUT /api/followup/{session_id}/complete
pub async fn put_complete_followup(
    State(state): State<GatewayState>,
    Path(session_id): Path<String>,
    Json(body): Json<CompleteFollowupRequest>,
) -> Result<Json<CompleteFollowupResponse>, ApiError> {
    let completed = state
        .orchestrator
        .complete_session(&body.user_id, &session_id, body.answers)
        .await?;
    Ok(Json(CompleteFollowupResponse {
        success: true,
        message: "Follow-up completed",
        user_id: body.user_id.trim().to_string(),
        session_id: completed.session_id,
        daily_record_id: completed.daily_record_id,
        status: "completed",
    }))
}

/// POST /api/quality/analyze
pub async fn post_analyze_quality(
    State(state): State<GatewayState>,
    Json(body): Json<AnalyzeRequest>,
) -> Result<Json<AnalyzeResponse>, ApiError> {
    let analysis = state
        .orchestrator
        .analyze(&body.user_id, &body.work_description)
        .await?;
    Ok(Json(AnalyzeResponse {
        user_id: body.user_id,
        quality_score: analysis.breakdown.quality_score,
        needs_followup: analysis.needs_followup,
        analysis: AnalysisDetails::from(&analysis.breakdown),
        recommendation: analysis.recommendation,
        threshold: analysis.threshold,
    }))
}

/// POST /api/reports/weekly
pub async fn post_weekly_report(
    State(state): State<GatewayState>,
    Json(body): Json<WeeklyReportRequest>,
) -> Result<Json<WeeklyReportResponse>, ApiError> {
    let start = parse_date("start_date", body.start_date.as_deref())?;
    let end = parse_date("end_date", body.end_date.as_deref())?;
    let today = Utc::now().date_naive();

    let report = state
        .synthesizer
        .build_report(&body.user_id, start, end, today)
        .await?;

    let response = match report {
        Report::NoData {
            message,
            start,
            end,
        } => WeeklyReportResponse {
            success: false,
            user_id: body.user_id.clone(),
            report: None,
            message: Some(message),
            metadata: ReportMetadata {
                user_id: body.user_id,
                date_range: date_range(start, end),
                data_summary: None,
                generated_at: None,
            },
        },
        Report::Generated {
            text,
            start,
            end,
            summary,
        } => WeeklyReportResponse {
            success: true,
            user_id: body.user_id.clone(),
            report: Some(text),
            message: None,
            metadata: ReportMetadata {
                user_id: body.user_id,
                date_range: date_range(start, end),
                generated_at: Some(summary.generated_at),
                data_summary: Some(summary),
            },
        },
    };
    Ok(Json(response))
}

/// POST /api/followup-sessions/list?limit=N
pub async fn post_list_sessions(
    State(state): State<GatewayState>,
    Query(query): Query<ListQuery>,
    Json(body): Json<OwnerRequest>,
) -> Result<Json<ListSessionsResponse>, ApiError> {
    let limit = query.limit.unwrap_or(DEFAULT_LIST_LIMIT);
    let sessions: Vec<SessionView> = state
        .orchestrator
        .list_sessions(&body.user_id, limit)
        .await?
        .into_iter()
        .map(SessionView::from)
        .collect();
    Ok(Json(ListSessionsResponse {
        success: true,
        user_id: body.user_id,
        count: sessions.len(),
        sessions,
    }))
}

/// GET /api/ai/test
pub async fn get_ai_test(State(state): State<GatewayState>) -> Json<ConnectivityResponse> {
    let probe = state.provider.test_connection().await;
    Json(ConnectivityResponse {
        success: probe.is_working(),
        message: "Connectivity test completed",
        test_results: ConnectivityResults {
            timestamp: Utc::now(),
            provider: state.provider.name().to_string(),
            server_url: probe.server_url.clone(),
            test_results: probe,
        },
    })
}

/// GET /stats
pub async fn get_stats(State(state): State<GatewayState>) -> Result<Json<StatsResponse>, ApiError> {
    let store = state.storage.stats().await?;
    let probe = state.provider.test_connection().await;
    Ok(Json(StatsResponse {
        store,
        uptime_secs: state.start_time.elapsed().as_secs(),
        ai_provider: ProviderStatus {
            kind: "local",
            name: state.provider.name().to_string(),
            status: connection_label(probe.is_working()),
        },
    }))
}

fn connection_label(working: bool) -> &'static str {
    if working { "connected" } else { "offline" }
}

fn parse_date(field: &str, raw: Option<&str>) -> Result<Option<NaiveDate>, StandupError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(raw) => NaiveDate::parse_from_str(raw, DATE_FORMAT)
            .map(Some)
            .map_err(|_| StandupError::Validation(format!("{field} must be YYYY-MM-DD, got {raw}"))),
    }
}

fn date_range(start: NaiveDate, end: NaiveDate) -> DateRange {
    DateRange {
        start: start.format(DATE_FORMAT).to_string(),
        end: end.format(DATE_FORMAT).to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dates_parse_or_reject() {
        assert_eq!(parse_date("start_date", None).unwrap(), None);
        assert_eq!(parse_date("start_date", Some("  ")).unwrap(), None);
        assert_eq!(
            parse_date("start_date", Some("2026-03-02")).unwrap(),
            NaiveDate::from_ymd_opt(2026, 3, 2)
        );
        let err = parse_date("end_date", Some("03/02/2026")).unwrap_err();
        assert!(matches!(err, StandupError::Validation(msg) if msg.contains("end_date")));
    }

    #[test]
    fn work_update_accepts_wfh_and_optional_fields() {
        let body: WorkUpdateRequest =
            serde_json::from_str(r#"{"user_id":"intern-1","status":"wfh"}"#).unwrap();
        assert_eq!(body.status, WorkStatus::Remote);
        assert!(body.task.is_none());
        assert!(body.date.is_none());
        assert!(body.stack.is_empty());
    }

    #[test]
    fn pending_response_uses_client_field_names() {
        let response = WorkUpdateResponse {
            success: true,
            message: "Requires follow-up (Score: 5.5/10)".into(),
            user_id: "intern-1".into(),
            record_id: None,
            temp_work_update_id: Some("p-1".into()),
            redirect_to_followup: true,
            quality_score: Some(5.5),
            status: "pending_followup",
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["tempWorkUpdateId"], "p-1");
        assert_eq!(json["redirectToFollowup"], true);
        assert_eq!(json["qualityScore"], 5.5);
        assert!(json.get("recordId").is_none());
    }
}
