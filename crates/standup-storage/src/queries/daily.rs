// SPDX-FileCopyrightText: 2026 Standup Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Daily record operations. One row per owner and day; writes replace.

use chrono::NaiveDate;
use rusqlite::{OptionalExtension, Row, params};
use standup_core::{DailyRecord, StandupError};
use tracing::warn;

use crate::database::{Database, map_tr_err};
use crate::models::{DailyDocument, RowKeys};

struct DailyRow {
    id: String,
    owner_id: String,
    date: String,
    body: String,
}

impl DailyRow {
    fn from_row(row: &Row<'_>) -> Result<Self, rusqlite::Error> {
        Ok(Self {
            id: row.get(0)?,
            owner_id: row.get(1)?,
            date: row.get(2)?,
            body: row.get(3)?,
        })
    }

    fn decode(self) -> Option<DailyRecord> {
        match serde_json::from_str::<DailyDocument>(&self.body) {
            Ok(doc) => doc.normalize(RowKeys {
                id: self.id,
                owner_id: self.owner_id,
                date: self.date,
            }),
            Err(e) => {
                warn!(id = %self.id, error = %e, "skipping daily record with unreadable body");
                None
            }
        }
    }
}

/// Replace-by-(owner, date): keeps the existing row ID when one is present.
pub async fn upsert_daily_record(db: &Database, record: &DailyRecord) -> Result<String, StandupError> {
    let body = serde_json::to_string(&DailyDocument::from_record(record)).map_err(|e| {
        StandupError::Storage {
            source: Box::new(e),
        }
    })?;
    let candidate_id = record.id.clone();
    let owner_id = record.owner_id.clone();
    let date = record.date.to_string();
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            let existing: Option<String> = tx
                .query_row(
                    "SELECT id FROM daily_records WHERE owner_id = ?1 AND date = ?2",
                    params![owner_id, date],
                    |row| row.get(0),
                )
                .optional()?;
            let id = match existing {
                Some(id) => {
                    tx.execute(
                        "UPDATE daily_records
                         SET body = ?2, updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                         WHERE id = ?1",
                        params![id, body],
                    )?;
                    id
                }
                None => {
                    tx.execute(
                        "INSERT INTO daily_records (id, owner_id, date, body) VALUES (?1, ?2, ?3, ?4)",
                        params![candidate_id, owner_id, date, body],
                    )?;
                    candidate_id
                }
            };
            tx.commit()?;
            Ok(id)
        })
        .await
        .map_err(map_tr_err)
}

pub async fn get_daily_record(
    db: &Database,
    owner_id: &str,
    date: NaiveDate,
) -> Result<Option<DailyRecord>, StandupError> {
    let owner_id = owner_id.to_string();
    let date = date.to_string();
    let row = db
        .connection()
        .call(move |conn| {
            conn.query_row(
                "SELECT id, owner_id, date, body FROM daily_records WHERE owner_id = ?1 AND date = ?2",
                params![owner_id, date],
                DailyRow::from_row,
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)?;
    Ok(row.and_then(DailyRow::decode))
}

pub async fn daily_records_between(
    db: &Database,
    owner_id: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<DailyRecord>, StandupError> {
    let owner_id = owner_id.to_string();
    let start = start.to_string();
    let end = end.to_string();
    let rows = db
        .connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, owner_id, date, body FROM daily_records
                 WHERE owner_id = ?1 AND date >= ?2 AND date <= ?3
                 ORDER BY date ASC",
            )?;
            let rows = stmt.query_map(params![owner_id, start, end], DailyRow::from_row)?;
            rows.collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(map_tr_err)?;
    Ok(rows.into_iter().filter_map(DailyRow::decode).collect())
}

/// Row counts as `(pending_updates, daily_records)`.
pub async fn collection_counts(db: &Database) -> Result<(u64, u64), StandupError> {
    db.connection()
        .call(|conn| {
            let (pending, daily): (i64, i64) = conn.query_row(
                "SELECT (SELECT COUNT(*) FROM pending_updates), (SELECT COUNT(*) FROM daily_records)",
                [],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )?;
            Ok((pending as u64, daily as u64))
        })
        .await
        .map_err(map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use standup_core::WorkStatus;

    async fn test_db() -> (tempfile::TempDir, Database) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("daily.db");
        let db = Database::open(path.to_str().unwrap(), true).await.unwrap();
        (dir, db)
    }

    fn record(id: &str, day: u32, task: &str) -> DailyRecord {
        DailyRecord {
            id: id.to_string(),
            owner_id: "u1".to_string(),
            date: NaiveDate::from_ymd_opt(2026, 3, day).unwrap(),
            stack: "frontend".to_string(),
            task: task.to_string(),
            progress: String::new(),
            blockers: String::new(),
            status: WorkStatus::Working,
            quality_score: Some(7.0),
            followup_skipped: true,
            followup_completed: false,
            followup_answers: Vec::new(),
            breakdown: None,
        }
    }

    #[tokio::test]
    async fn second_write_for_same_day_replaces_first() {
        let (_dir, db) = test_db().await;
        let first = upsert_daily_record(&db, &record("r1", 2, "first")).await.unwrap();
        let second = upsert_daily_record(&db, &record("r2", 2, "second")).await.unwrap();
        assert_eq!(first, "r1");
        assert_eq!(second, "r1", "replace keeps the original row id");

        let day = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
        let all = daily_records_between(&db, "u1", day, day).await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].task, "second");
        assert_eq!(get_daily_record(&db, "u1", day).await.unwrap().unwrap().task, "second");
    }

    #[tokio::test]
    async fn range_is_inclusive_and_ordered() {
        let (_dir, db) = test_db().await;
        for (id, day) in [("c", 5), ("a", 1), ("b", 3), ("z", 9)] {
            upsert_daily_record(&db, &record(id, day, id)).await.unwrap();
        }
        let from = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        let to = NaiveDate::from_ymd_opt(2026, 3, 5).unwrap();
        let ids: Vec<_> = daily_records_between(&db, "u1", from, to)
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec!["a", "b", "c"]);

        let (_, daily) = collection_counts(&db).await.unwrap();
        assert_eq!(daily, 4);
    }
}
