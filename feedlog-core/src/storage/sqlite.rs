//! SQLite storage implementation.
//!
//! Provides [`SqliteStore`] as the storage backend for feeding records.

use std::path::PathBuf;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::Row;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};

use crate::record::{Amount, FeedingRecord, RecordId};
use crate::storage::{FeedingStore, StorageError};

#[cfg(test)]
mod tests;

/// SQLite-based feeding record storage.
///
/// Uses connection pooling and WAL mode.
/// Runs migrations automatically on startup.
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Create a new SqliteStore from a database URL.
    ///
    /// The URL should be in the format `sqlite:path/to/database.db`; a bare
    /// path is accepted too. The file and its parent directory are created
    /// if missing. `sqlite::memory:` opens a private in-memory database.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Database`] if connection fails.
    /// Returns [`StorageError::Migration`] if migrations fail.
    pub async fn new(database_url: &str) -> Result<Self, StorageError> {
        let url = database_url
            .strip_prefix("sqlite://")
            .or_else(|| database_url.strip_prefix("sqlite:"))
            .unwrap_or(database_url);

        if url == ":memory:" || url.contains("mode=memory") {
            return Self::new_in_memory(database_url).await;
        }

        let path = PathBuf::from(url);
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| {
                StorageError::Database(format!("failed to create database directory: {}", e))
            })?;
        }

        let options = SqliteConnectOptions::new()
            .filename(url)
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .map_err(|e| StorageError::Database(e.to_string()))?;

        let store = Self { pool };
        store.run_migrations().await?;

        Ok(store)
    }

    /// An in-memory database lives only as long as its connection, so the
    /// pool keeps exactly one that never expires.
    async fn new_in_memory(database_url: &str) -> Result<Self, StorageError> {
        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(|e| StorageError::Database(e.to_string()))?;

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .map_err(|e| StorageError::Database(e.to_string()))?;

        let store = Self { pool };
        store.run_migrations().await?;

        Ok(store)
    }

    /// Run database migrations.
    async fn run_migrations(&self) -> Result<(), StorageError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| StorageError::Migration(e.to_string()))
    }

    /// Insert a record with an explicit creation time.
    ///
    /// Used for back-dated imports; [`FeedingStore::insert`] stamps the
    /// current time through this.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Database`] if the insert fails.
    pub async fn insert_at(
        &self,
        owner_id: u64,
        amount: Amount,
        created_at: DateTime<Utc>,
    ) -> Result<RecordId, StorageError> {
        let result = sqlx::query(
            r#"
            INSERT INTO feedings (owner_id, amount, created_at)
            VALUES (?, ?, ?)
            "#,
        )
        .bind(Self::owner_to_db(owner_id)?)
        .bind(amount.get())
        .bind(Self::encode_timestamp(created_at))
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Database(e.to_string()))?;

        Ok(result.last_insert_rowid())
    }

    /// Fixed-width UTC text; lexical order equals chronological order.
    fn encode_timestamp(instant: DateTime<Utc>) -> String {
        instant.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    fn decode_timestamp(s: &str) -> Result<DateTime<Utc>, StorageError> {
        DateTime::parse_from_rfc3339(s)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| StorageError::InvalidData(format!("invalid datetime: {}", e)))
    }

    fn owner_to_db(owner_id: u64) -> Result<i64, StorageError> {
        i64::try_from(owner_id)
            .map_err(|_| StorageError::InvalidData(format!("owner id out of range: {}", owner_id)))
    }

    fn record_from_row(row: &SqliteRow) -> Result<FeedingRecord, StorageError> {
        let owner: i64 = row.get("owner_id");
        let owner_id = u64::try_from(owner)
            .map_err(|_| StorageError::InvalidData(format!("negative owner id: {}", owner)))?;

        let amount: i64 = row.get("amount");
        let amount = Amount::new(amount).map_err(|e| StorageError::InvalidData(e.to_string()))?;

        let created_at: String = row.get("created_at");

        Ok(FeedingRecord {
            id: row.get("id"),
            owner_id,
            amount,
            created_at: Self::decode_timestamp(&created_at)?,
        })
    }
}

#[async_trait]
impl FeedingStore for SqliteStore {
    async fn insert(&self, owner_id: u64, amount: Amount) -> Result<RecordId, StorageError> {
        self.insert_at(owner_id, amount, Utc::now()).await
    }

    async fn delete_by_id_and_owner(
        &self,
        id: RecordId,
        owner_id: u64,
    ) -> Result<bool, StorageError> {
        let result = sqlx::query(
            r#"
            DELETE FROM feedings WHERE id = ? AND owner_id = ?
            "#,
        )
        .bind(id)
        .bind(Self::owner_to_db(owner_id)?)
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Database(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }

    async fn sum_all(&self) -> Result<i64, StorageError> {
        sqlx::query_scalar::<_, i64>("SELECT COALESCE(SUM(amount), 0) FROM feedings")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| StorageError::Database(e.to_string()))
    }

    async fn sum_since(&self, since: DateTime<Utc>) -> Result<i64, StorageError> {
        sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COALESCE(SUM(amount), 0) FROM feedings WHERE created_at >= ?
            "#,
        )
        .bind(Self::encode_timestamp(since))
        .fetch_one(&self.pool)
        .await
        .map_err(|e| StorageError::Database(e.to_string()))
    }

    async fn list_since(&self, since: DateTime<Utc>) -> Result<Vec<FeedingRecord>, StorageError> {
        let rows = sqlx::query(
            r#"
            SELECT id, owner_id, amount, created_at
            FROM feedings
            WHERE created_at >= ?
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(Self::encode_timestamp(since))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StorageError::Database(e.to_string()))?;

        rows.iter().map(Self::record_from_row).collect()
    }
}

/// Open the store behind `database_url` as a shared [`FeedingStore`].
///
/// # Errors
///
/// Returns [`StorageError`] if the database cannot be opened or migrated.
pub async fn create_storage(database_url: &str) -> Result<Box<dyn FeedingStore>, StorageError> {
    let store = SqliteStore::new(database_url).await?;
    tracing::debug!("Feeding store ready");
    Ok(Box::new(store))
}
