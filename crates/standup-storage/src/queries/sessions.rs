// SPDX-FileCopyrightText: 2026 Standup Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Follow-up session operations.

use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{OptionalExtension, Row, params};
use standup_core::{FollowupSession, SessionStatus, StandupError};

use crate::database::{Database, map_tr_err};
use crate::models::{format_timestamp, parse_date, parse_timestamp};

const SELECT_COLUMNS: &str = "SELECT id, owner_id, pending_id, session_date, questions, answers, \
     status, created_at, completed_at FROM followup_sessions";

fn conversion_err(col: usize, msg: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(col, Type::Text, msg.into())
}

fn json_list(row: &Row<'_>, col: usize) -> Result<Vec<String>, rusqlite::Error> {
    let raw: String = row.get(col)?;
    serde_json::from_str(&raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(col, Type::Text, Box::new(e)))
}

fn timestamp(row: &Row<'_>, col: usize) -> Result<DateTime<Utc>, rusqlite::Error> {
    let raw: String = row.get(col)?;
    parse_timestamp(&raw).ok_or_else(|| conversion_err(col, format!("bad timestamp `{raw}`")))
}

fn session_from_row(row: &Row<'_>) -> Result<FollowupSession, rusqlite::Error> {
    let raw_date: String = row.get(3)?;
    let raw_status: String = row.get(6)?;
    let completed_at: Option<String> = row.get(8)?;
    Ok(FollowupSession {
        id: row.get(0)?,
        owner_id: row.get(1)?,
        pending_id: row.get(2)?,
        session_date: parse_date(&raw_date)
            .ok_or_else(|| conversion_err(3, format!("bad date `{raw_date}`")))?,
        questions: json_list(row, 4)?,
        answers: json_list(row, 5)?,
        status: raw_status
            .parse()
            .map_err(|_| conversion_err(6, format!("unknown status `{raw_status}`")))?,
        created_at: timestamp(row, 7)?,
        completed_at: completed_at.as_deref().and_then(parse_timestamp),
    })
}

fn to_json(list: &[String]) -> Result<String, StandupError> {
    serde_json::to_string(list).map_err(|e| StandupError::Storage {
        source: Box::new(e),
    })
}

pub async fn insert_session(db: &Database, session: &FollowupSession) -> Result<(), StandupError> {
    let questions = to_json(&session.questions)?;
    let answers = to_json(&session.answers)?;
    let session = session.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO followup_sessions
                 (id, owner_id, pending_id, session_date, questions, answers, status, created_at, completed_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    session.id,
                    session.owner_id,
                    session.pending_id,
                    session.session_date.to_string(),
                    questions,
                    answers,
                    session.status.to_string(),
                    format_timestamp(session.created_at),
                    session.completed_at.map(format_timestamp),
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

pub async fn get_session(db: &Database, id: &str) -> Result<Option<FollowupSession>, StandupError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            conn.query_row(
                &format!("{SELECT_COLUMNS} WHERE id = ?1"),
                params![id],
                session_from_row,
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)
}

pub async fn open_session_for_pending(
    db: &Database,
    pending_id: &str,
) -> Result<Option<FollowupSession>, StandupError> {
    let pending_id = pending_id.to_string();
    let status = SessionStatus::Pending.to_string();
    db.connection()
        .call(move |conn| {
            conn.query_row(
                &format!(
                    "{SELECT_COLUMNS} WHERE pending_id = ?1 AND status = ?2
                     ORDER BY created_at DESC LIMIT 1"
                ),
                params![pending_id, status],
                session_from_row,
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)
}

pub async fn complete_session(
    db: &Database,
    id: &str,
    answers: &[String],
    completed_at: DateTime<Utc>,
) -> Result<bool, StandupError> {
    let id = id.to_string();
    let answers = to_json(answers)?;
    let completed_at = format_timestamp(completed_at);
    let status = SessionStatus::Completed.to_string();
    db.connection()
        .call(move |conn| {
            let updated = conn.execute(
                "UPDATE followup_sessions SET answers = ?2, status = ?3, completed_at = ?4
                 WHERE id = ?1",
                params![id, answers, status, completed_at],
            )?;
            Ok(updated > 0)
        })
        .await
        .map_err(map_tr_err)
}

pub async fn list_sessions(
    db: &Database,
    owner_id: &str,
    limit: usize,
) -> Result<Vec<FollowupSession>, StandupError> {
    let owner_id = owner_id.to_string();
    let limit = i64::try_from(limit).unwrap_or(i64::MAX);
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "{SELECT_COLUMNS} WHERE owner_id = ?1 ORDER BY created_at DESC LIMIT ?2"
            ))?;
            let rows = stmt.query_map(params![owner_id, limit], session_from_row)?;
            rows.collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(map_tr_err)
}

pub async fn sessions_between(
    db: &Database,
    owner_id: &str,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<Vec<FollowupSession>, StandupError> {
    let owner_id = owner_id.to_string();
    let start = format_timestamp(start);
    let end = format_timestamp(end);
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "{SELECT_COLUMNS} WHERE owner_id = ?1 AND created_at >= ?2 AND created_at <= ?3
                 ORDER BY created_at ASC"
            ))?;
            let rows = stmt.query_map(params![owner_id, start, end], session_from_row)?;
            rows.collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(map_tr_err)
}

/// Session counts as `(pending, completed)`.
pub async fn count_by_status(db: &Database) -> Result<(u64, u64), StandupError> {
    db.connection()
        .call(|conn| {
            let (pending, completed): (i64, i64) = conn.query_row(
                "SELECT COALESCE(SUM(status = 'pending'), 0), COALESCE(SUM(status = 'completed'), 0)
                 FROM followup_sessions",
                [],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )?;
            Ok((pending as u64, completed as u64))
        })
        .await
        .map_err(map_tr_err)
}
