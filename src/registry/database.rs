//! Epoch Metadata Registry Module
//!
//! This module implements a SQLite registry for per-epoch metadata.
//! The registry allows auditing epochs without keeping the transactions around.
//!
//! # Storage
//! One row per epoch: ID, accepted and rejected counts, passes, pool size after the
//! epoch, and the time it was resolved.

use crate::EpochMetadata;
use sqlx::{Row, SqlitePool, sqlite::SqlitePoolOptions};

/// Epoch metadata registry
pub struct Registry {
    db: SqlitePool,
}

impl Registry {
    /// Connects to the database at `url` and creates the table if needed
    ///
    /// # Arguments
    /// * `url` - SQLite connection URL (e.g., "sqlite://registry.db?mode=rwc" or
    ///   "sqlite::memory:")
    pub async fn connect(url: &str) -> anyhow::Result<Self> {
        // A single connection keeps an in-memory database shared across queries
        let db = SqlitePoolOptions::new()
            .max_connections(1)
            .connect(url)
            .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS epochs (
                epoch_id INTEGER PRIMARY KEY,
                accepted_count INTEGER NOT NULL,
                rejected_count INTEGER NOT NULL,
                passes INTEGER NOT NULL,
                pool_size INTEGER NOT NULL,
                timestamp INTEGER NOT NULL
            )",
        )
        .execute(&db)
        .await?;

        Ok(Self { db })
    }

    /// Store epoch metadata
    ///
    /// # Returns
    /// `Err` if the epoch ID was already recorded or the insert failed
    pub async fn store(&self, metadata: &EpochMetadata) -> anyhow::Result<()> {
        sqlx::query(
            "INSERT INTO epochs (epoch_id, accepted_count, rejected_count, passes, pool_size, timestamp)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(metadata.epoch_id as i64)
        .bind(metadata.accepted_count as i64)
        .bind(metadata.rejected_count as i64)
        .bind(metadata.passes as i64)
        .bind(metadata.pool_size as i64)
        .bind(metadata.timestamp as i64)
        .execute(&self.db)
        .await?;
        Ok(())
    }

    /// Fetch metadata for one epoch
    pub async fn get(&self, epoch_id: u64) -> anyhow::Result<Option<EpochMetadata>> {
        let row = sqlx::query(
            "SELECT epoch_id, accepted_count, rejected_count, passes, pool_size, timestamp
             FROM epochs WHERE epoch_id = ?",
        )
        .bind(epoch_id as i64)
        .fetch_optional(&self.db)
        .await?;

        Ok(row.map(|row| EpochMetadata {
            epoch_id: row.get::<i64, _>("epoch_id") as u64,
            accepted_count: row.get::<i64, _>("accepted_count") as usize,
            rejected_count: row.get::<i64, _>("rejected_count") as usize,
            passes: row.get::<i64, _>("passes") as usize,
            pool_size: row.get::<i64, _>("pool_size") as usize,
            timestamp: row.get::<i64, _>("timestamp") as u64,
        }))
    }

    pub async fn count(&self) -> anyhow::Result<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM epochs")
            .fetch_one(&self.db)
            .await?;
        Ok(count as u64)
    }
}
