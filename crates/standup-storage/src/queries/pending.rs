// SPDX-FileCopyrightText: 2026 Standup Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pending-update operations, including the age sweep and the expiry trigger.

use chrono::{DateTime, Utc};
use rusqlite::{OptionalExtension, Row, params};
use standup_core::{PendingRecord, StandupError};
use tracing::warn;

use crate::database::{Database, map_tr_err};
use crate::models::{PendingDocument, RowKeys, format_timestamp};

/// Name of the trigger that gives the pending table a store-level expiry.
pub const EXPIRY_TRIGGER: &str = "pending_updates_expiry";

const SELECT_COLUMNS: &str = "SELECT id, owner_id, date, submitted_at, body FROM pending_updates";

/// Raw row, decoded outside the statement so a single bad body is skipped
/// rather than failing the whole read.
struct PendingRow {
    id: String,
    owner_id: String,
    date: String,
    submitted_at: String,
    body: String,
}

impl PendingRow {
    fn from_row(row: &Row<'_>) -> Result<Self, rusqlite::Error> {
        Ok(Self {
            id: row.get(0)?,
            owner_id: row.get(1)?,
            date: row.get(2)?,
            submitted_at: row.get(3)?,
            body: row.get(4)?,
        })
    }

    fn decode(self) -> Option<PendingRecord> {
        let doc: PendingDocument = match serde_json::from_str(&self.body) {
            Ok(doc) => doc,
            Err(e) => {
                warn!(id = %self.id, error = %e, "skipping pending update with unreadable body");
                return None;
            }
        };
        let id = self.id.clone();
        let record = doc.normalize(
            RowKeys {
                id: self.id,
                owner_id: self.owner_id,
                date: self.date,
            },
            &self.submitted_at,
        );
        if record.is_none() {
            warn!(id = %id, "skipping pending update without a usable date");
        }
        record
    }
}

pub async fn insert_pending(db: &Database, record: &PendingRecord) -> Result<(), StandupError> {
    let body = serde_json::to_string(&PendingDocument::from_record(record)).map_err(|e| {
        StandupError::Storage {
            source: Box::new(e),
        }
    })?;
    let id = record.id.clone();
    let owner_id = record.owner_id.clone();
    let date = record.date.to_string();
    let submitted_at = format_timestamp(record.submitted_at);
    let completed = record.followup_completed;
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO pending_updates (id, owner_id, date, submitted_at, followup_completed, body)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![id, owner_id, date, submitted_at, completed, body],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

pub async fn get_pending(db: &Database, id: &str) -> Result<Option<PendingRecord>, StandupError> {
    let id = id.to_string();
    let row = db
        .connection()
        .call(move |conn| {
            conn.query_row(
                &format!("{SELECT_COLUMNS} WHERE id = ?1"),
                params![id],
                PendingRow::from_row,
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)?;
    Ok(row.and_then(PendingRow::decode))
}

pub async fn latest_unresolved_pending(
    db: &Database,
    owner_id: &str,
) -> Result<Option<PendingRecord>, StandupError> {
    let owner_id = owner_id.to_string();
    let rows = db
        .connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "{SELECT_COLUMNS} WHERE owner_id = ?1 AND followup_completed = 0
                 ORDER BY submitted_at DESC"
            ))?;
            let rows = stmt.query_map(params![owner_id], PendingRow::from_row)?;
            rows.collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(map_tr_err)?;
    Ok(rows.into_iter().find_map(PendingRow::decode))
}

pub async fn list_pending(db: &Database, owner_id: &str) -> Result<Vec<PendingRecord>, StandupError> {
    let owner_id = owner_id.to_string();
    let rows = db
        .connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "{SELECT_COLUMNS} WHERE owner_id = ?1 ORDER BY submitted_at DESC"
            ))?;
            let rows = stmt.query_map(params![owner_id], PendingRow::from_row)?;
            rows.collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(map_tr_err)?;
    Ok(rows.into_iter().filter_map(PendingRow::decode).collect())
}

pub async fn delete_pending(db: &Database, id: &str) -> Result<bool, StandupError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            let deleted = conn.execute("DELETE FROM pending_updates WHERE id = ?1", params![id])?;
            Ok(deleted > 0)
        })
        .await
        .map_err(map_tr_err)
}

pub async fn delete_pending_before(db: &Database, cutoff: DateTime<Utc>) -> Result<u64, StandupError> {
    let cutoff = format_timestamp(cutoff);
    db.connection()
        .call(move |conn| {
            let deleted = conn.execute(
                "DELETE FROM pending_updates WHERE submitted_at < ?1",
                params![cutoff],
            )?;
            Ok(deleted as u64)
        })
        .await
        .map_err(map_tr_err)
}

/// Install (or, with `None`, remove) the trigger that drops pending rows
/// older than `hours` whenever a new row is staged.
pub async fn configure_expiry(db: &Database, hours: Option<u32>) -> Result<(), StandupError> {
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            conn.execute_batch(&format!("DROP TRIGGER IF EXISTS {EXPIRY_TRIGGER};"))?;
            if let Some(hours) = hours {
                conn.execute_batch(&format!(
                    "CREATE TRIGGER {EXPIRY_TRIGGER} AFTER INSERT ON pending_updates
                     BEGIN
                         DELETE FROM pending_updates
                         WHERE submitted_at < strftime('%Y-%m-%dT%H:%M:%fZ', 'now', '-{hours} hours');
                     END;"
                ))?;
            }
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

pub async fn expiry_active(db: &Database) -> Result<bool, StandupError> {
    db.connection()
        .call(|conn| {
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'trigger' AND name = ?1",
                params![EXPIRY_TRIGGER],
                |row| row.get(0),
            )?;
            Ok(count > 0)
        })
        .await
        .map_err(map_tr_err)
}
