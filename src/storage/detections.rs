//! Detection table access.
//!
//! The table is keyed by `domain`. Inserts use `ON CONFLICT(domain) DO NOTHING`,
//! so the existence check and the write are one atomic statement: two tasks
//! racing on the same domain produce exactly one row and exactly one
//! `InsertOutcome::Inserted`.

use std::path::Path;

use log::{info, warn};
use sqlx::{Row, SqlitePool};

use crate::config::validate_table_name;
use crate::error_handling::DatabaseError;
use crate::storage::circuit_breaker::StoreCircuitBreaker;
use crate::storage::models::{DetectionRecord, InsertOutcome};
use crate::storage::pool::init_db_pool_with_path;

/// Persistent first-seen store for detected domains.
pub struct DetectionStore {
    pool: SqlitePool,
    table: String,
    breaker: StoreCircuitBreaker,
}

impl DetectionStore {
    /// Opens (or creates) the SQLite file and makes sure the table exists.
    pub async fn open(db_path: &Path, table: &str) -> Result<Self, DatabaseError> {
        let pool = init_db_pool_with_path(db_path).await?;
        Self::with_pool(pool, table).await
    }

    /// Uses an existing pool. Creates the table if it is missing.
    ///
    /// # Errors
    ///
    /// Returns an error if `table` is not a plain identifier or the schema
    /// statements fail.
    pub async fn with_pool(pool: SqlitePool, table: &str) -> Result<Self, DatabaseError> {
        validate_table_name(table)?;
        let store = DetectionStore {
            pool,
            table: table.to_string(),
            breaker: StoreCircuitBreaker::new(),
        };
        store.create_table().await?;
        Ok(store)
    }

    /// Replaces the circuit breaker (tests use a short cooldown).
    pub fn with_breaker(mut self, breaker: StoreCircuitBreaker) -> Self {
        self.breaker = breaker;
        self
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Creates the detection table if it doesn't exist.
    ///
    /// The unique index also covers tables created by older tools without a
    /// key on `domain`.
    async fn create_table(&self) -> Result<(), DatabaseError> {
        sqlx::query(&format!(
            "CREATE TABLE IF NOT EXISTS \"{table}\" (
                domain TEXT NOT NULL PRIMARY KEY,
                san TEXT NOT NULL DEFAULT '',
                issuer TEXT NOT NULL DEFAULT '',
                fingerprint TEXT NOT NULL DEFAULT '',
                start_time TEXT NOT NULL DEFAULT '',
                first_seen TEXT NOT NULL
            )",
            table = self.table
        ))
        .execute(&self.pool)
        .await?;

        sqlx::query(&format!(
            "CREATE UNIQUE INDEX IF NOT EXISTS \"{table}_domain_uq\" ON \"{table}\" (domain)",
            table = self.table
        ))
        .execute(&self.pool)
        .await?;

        info!("Detection table \"{}\" ready", self.table);
        Ok(())
    }

    fn guard(&self) -> Result<(), DatabaseError> {
        if self.breaker.allow() {
            Ok(())
        } else {
            Err(DatabaseError::CircuitOpen)
        }
    }

    fn track<T>(&self, result: Result<T, sqlx::Error>) -> Result<T, DatabaseError> {
        match result {
            Ok(value) => {
                self.breaker.record_success();
                Ok(value)
            }
            Err(e) => {
                self.breaker.record_failure();
                Err(DatabaseError::SqlError(e))
            }
        }
    }

    /// True iff a detection for `domain` is already stored.
    pub async fn exists(&self, domain: &str) -> Result<bool, DatabaseError> {
        self.guard()?;
        let result = sqlx::query(&format!(
            "SELECT 1 FROM \"{}\" WHERE domain = ? LIMIT 1",
            self.table
        ))
        .bind(domain)
        .fetch_optional(&self.pool)
        .await;
        self.track(result).map(|row| row.is_some())
    }

    /// Inserts `record` unless its domain is already stored.
    pub async fn insert(&self, record: &DetectionRecord) -> Result<InsertOutcome, DatabaseError> {
        self.guard()?;
        let result = sqlx::query(&format!(
            "INSERT INTO \"{}\" (domain, san, issuer, fingerprint, start_time, first_seen) \
             VALUES (?, ?, ?, ?, ?, ?) \
             ON CONFLICT(domain) DO NOTHING",
            self.table
        ))
        .bind(&record.domain)
        .bind(&record.san)
        .bind(&record.issuer)
        .bind(&record.fingerprint)
        .bind(&record.start_time)
        .bind(&record.first_seen)
        .execute(&self.pool)
        .await;

        let done = self.track(result)?;
        Ok(if done.rows_affected() == 1 {
            InsertOutcome::Inserted
        } else {
            InsertOutcome::AlreadyPresent
        })
    }

    /// Looks up the stored record for `domain`.
    pub async fn get(&self, domain: &str) -> Result<Option<DetectionRecord>, DatabaseError> {
        let row = sqlx::query(&format!(
            "SELECT domain, san, issuer, fingerprint, start_time, first_seen \
             FROM \"{}\" WHERE domain = ?",
            self.table
        ))
        .bind(domain)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|row| record_from_row(&row)))
    }

    /// All stored detections, oldest first.
    pub async fn list(&self) -> Result<Vec<DetectionRecord>, DatabaseError> {
        let rows = sqlx::query(&format!(
            "SELECT domain, san, issuer, fingerprint, start_time, first_seen \
             FROM \"{}\" ORDER BY first_seen, domain",
            self.table
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(record_from_row).collect())
    }

    pub async fn count(&self) -> Result<i64, DatabaseError> {
        let count = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM \"{}\"", self.table))
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Checkpoints the WAL and closes the pool.
    pub async fn close(&self) {
        if let Err(e) = sqlx::query("PRAGMA wal_checkpoint(TRUNCATE)")
            .execute(&self.pool)
            .await
        {
            warn!("Failed to checkpoint WAL file (this is non-critical): {}", e);
        }
        self.pool.close().await;
        info!("Detection store closed");
    }
}

fn record_from_row(row: &sqlx::sqlite::SqliteRow) -> DetectionRecord {
    DetectionRecord {
        domain: row.get("domain"),
        san: row.get("san"),
        issuer: row.get("issuer"),
        fingerprint: row.get("fingerprint"),
        start_time: row.get("start_time"),
        first_seen: row.get("first_seen"),
    }
}
