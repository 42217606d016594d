//! # SqliteStore
//!
//! One pool-backed store implementing both the vote ledger and the
//! reputation-record ports.
//!
//! The `targets` table stands in for the vendor collection owned by the
//! surrounding directory system; rows appear there when a vendor profile is
//! created, which is outside this engine.

use async_trait::async_trait;
use domains::{BadgeGrant, EngineError, ReputationRecord, Result, VoteRecord};
use domains::{ReputationStore, VoteStore};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::Row;
use std::str::FromStr;
use tracing::debug;
use uuid::Uuid;

pub struct SqliteStore {
    pool: SqlitePool,
}

// Helpers for UUID conversion
fn uuid_to_blob(id: Uuid) -> Vec<u8> {
    id.as_bytes().to_vec()
}

fn blob_to_uuid(blob: &[u8]) -> Uuid {
    Uuid::from_slice(blob).unwrap_or_default()
}

fn persistence(err: sqlx::Error) -> EngineError {
    EngineError::Persistence(err.to_string())
}

impl SqliteStore {
    /// Opens (creating if missing) the database and ensures the schema.
    pub async fn connect(url: &str, max_connections: u32) -> anyhow::Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;

        let store = Self { pool };
        store.init_schema().await?;
        Ok(store)
    }

    async fn init_schema(&self) -> anyhow::Result<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS targets (
                id BLOB PRIMARY KEY,
                name TEXT NOT NULL,
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
            )",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS votes (
                id BLOB PRIMARY KEY,
                voter_id TEXT NOT NULL,
                target_id BLOB NOT NULL,
                cast_at TIMESTAMP NOT NULL,
                UNIQUE (voter_id, target_id)
            )",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS reputation (
                target_id BLOB PRIMARY KEY,
                grants TEXT NOT NULL,
                total_grants INTEGER NOT NULL,
                total_boost REAL NOT NULL,
                total_bonus_days INTEGER NOT NULL,
                has_special_mention INTEGER NOT NULL,
                revision INTEGER NOT NULL
            )",
        )
        .execute(&self.pool)
        .await?;

        debug!("sqlite schema ready");
        Ok(())
    }

    /// Registers a vendor profile row. In production the directory backend
    /// owns vendor creation; this seam exists for embedding and for tests.
    pub async fn insert_target(&self, id: Uuid, name: &str) -> Result<()> {
        sqlx::query("INSERT INTO targets (id, name) VALUES (?, ?)")
            .bind(uuid_to_blob(id))
            .bind(name)
            .execute(&self.pool)
            .await
            .map_err(persistence)?;
        Ok(())
    }

    fn record_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<ReputationRecord> {
        let grants: Vec<BadgeGrant> =
            serde_json::from_str(&row.get::<String, _>("grants")).map_err(|e| {
                EngineError::Persistence(format!("corrupt grant history: {e}"))
            })?;
        Ok(ReputationRecord {
            target_id: blob_to_uuid(row.get::<Vec<u8>, _>("target_id").as_slice()),
            grants,
            total_grants: row.get::<i64, _>("total_grants") as u64,
            total_boost: row.get("total_boost"),
            total_bonus_days: row.get::<i64, _>("total_bonus_days") as u32,
            has_special_mention: row.get("has_special_mention"),
            revision: row.get("revision"),
        })
    }
}

#[async_trait]
impl VoteStore for SqliteStore {
    /// Appends a vote. The UNIQUE (voter_id, target_id) constraint rejects
    /// a repeat vote; no pre-check query is made.
    async fn insert_vote(&self, vote: VoteRecord) -> Result<VoteRecord> {
        let result =
            sqlx::query("INSERT INTO votes (id, voter_id, target_id, cast_at) VALUES (?, ?, ?, ?)")
                .bind(uuid_to_blob(vote.id))
                .bind(&vote.voter_id)
                .bind(uuid_to_blob(vote.target_id))
                .bind(vote.cast_at)
                .execute(&self.pool)
                .await;

        match result {
            Ok(_) => Ok(vote),
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                Err(EngineError::DuplicateVote {
                    voter_id: vote.voter_id,
                    target_id: vote.target_id,
                })
            }
            Err(e) => Err(persistence(e)),
        }
    }

    async fn list_by_voter(&self, voter_id: &str) -> Result<Vec<VoteRecord>> {
        let rows = sqlx::query(
            "SELECT id, voter_id, target_id, cast_at FROM votes
             WHERE voter_id = ? ORDER BY cast_at DESC",
        )
        .bind(voter_id)
        .fetch_all(&self.pool)
        .await
        .map_err(persistence)?;

        Ok(rows
            .into_iter()
            .map(|row| VoteRecord {
                id: blob_to_uuid(row.get::<Vec<u8>, _>("id").as_slice()),
                voter_id: row.get("voter_id"),
                target_id: blob_to_uuid(row.get::<Vec<u8>, _>("target_id").as_slice()),
                cast_at: row.get("cast_at"),
            })
            .collect())
    }
}

#[async_trait]
impl ReputationStore for SqliteStore {
    async fn target_exists(&self, target_id: Uuid) -> Result<bool> {
        let row = sqlx::query("SELECT 1 FROM targets WHERE id = ?")
            .bind(uuid_to_blob(target_id))
            .fetch_optional(&self.pool)
            .await
            .map_err(persistence)?;
        Ok(row.is_some())
    }

    async fn find_by_target(&self, target_id: Uuid) -> Result<Option<ReputationRecord>> {
        let row = sqlx::query(
            "SELECT target_id, grants, total_grants, total_boost,
                    total_bonus_days, has_special_mention, revision
             FROM reputation WHERE target_id = ?",
        )
        .bind(uuid_to_blob(target_id))
        .fetch_optional(&self.pool)
        .await
        .map_err(persistence)?;

        match row {
            Some(row) => Ok(Some(Self::record_from_row(&row)?)),
            None => Ok(None),
        }
    }

    /// Optimistic-concurrency write of the whole record.
    ///
    /// Revision 0 inserts; a primary-key violation means another writer got
    /// there first. Anything else updates guarded by `WHERE revision = ?`,
    /// with zero affected rows meaning the loaded revision went stale.
    /// Exactly one of two concurrent writers commits.
    async fn save(&self, record: ReputationRecord) -> Result<ReputationRecord> {
        let expected = record.revision;
        let mut record = record;
        record.revision = expected + 1;

        let grants_json = serde_json::to_string(&record.grants)
            .map_err(|e| EngineError::Persistence(format!("grant history encode: {e}")))?;

        if expected == 0 {
            let result = sqlx::query(
                "INSERT INTO reputation
                   (target_id, grants, total_grants, total_boost,
                    total_bonus_days, has_special_mention, revision)
                 VALUES (?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(uuid_to_blob(record.target_id))
            .bind(&grants_json)
            .bind(record.total_grants as i64)
            .bind(record.total_boost)
            .bind(record.total_bonus_days as i64)
            .bind(record.has_special_mention)
            .bind(record.revision)
            .execute(&self.pool)
            .await;

            match result {
                Ok(_) => Ok(record),
                Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                    Err(EngineError::Conflict(format!(
                        "reputation record for {} was created concurrently",
                        record.target_id
                    )))
                }
                Err(e) => Err(persistence(e)),
            }
        } else {
            let result = sqlx::query(
                "UPDATE reputation
                 SET grants = ?, total_grants = ?, total_boost = ?,
                     total_bonus_days = ?, has_special_mention = ?, revision = ?
                 WHERE target_id = ? AND revision = ?",
            )
            .bind(&grants_json)
            .bind(record.total_grants as i64)
            .bind(record.total_boost)
            .bind(record.total_bonus_days as i64)
            .bind(record.has_special_mention)
            .bind(record.revision)
            .bind(uuid_to_blob(record.target_id))
            .bind(expected)
            .execute(&self.pool)
            .await
            .map_err(persistence)?;

            if result.rows_affected() == 0 {
                return Err(EngineError::Conflict(format!(
                    "stale revision {} for reputation record {}",
                    expected, record.target_id
                )));
            }
            Ok(record)
        }
    }
}
