//! Storage abstraction for feeding records.
//!
//! Provides the [`FeedingStore`] trait as a port for storage implementations,
//! along with error types and the SQLite adapter.

pub mod sqlite;

pub use sqlite::{SqliteStore, create_storage};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::record::{Amount, FeedingRecord, RecordId};

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// A database operation failed (connectivity, constraint violation, ...).
    #[error("database error: {0}")]
    Database(String),

    /// A migration operation failed.
    #[error("migration error: {0}")]
    Migration(String),

    /// Invalid data was encountered.
    #[error("invalid data: {0}")]
    InvalidData(String),
}

/// Port for feeding record storage.
#[async_trait]
pub trait FeedingStore: Send + Sync {
    /// Insert a record owned by `owner_id`. The store assigns the ID and the
    /// creation timestamp.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Database`] if the insert fails.
    async fn insert(&self, owner_id: u64, amount: Amount) -> Result<RecordId, StorageError>;

    /// Delete the record with `id` if, and only if, it belongs to `owner_id`.
    ///
    /// # Returns
    ///
    /// `Ok(true)` if a row was removed, `Ok(false)` if nothing matched both
    /// the ID and the owner. Neither case is an error.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Database`] if the delete fails.
    async fn delete_by_id_and_owner(
        &self,
        id: RecordId,
        owner_id: u64,
    ) -> Result<bool, StorageError>;

    /// Sum of all amounts ever recorded. `0` for an empty store.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Database`] if the query fails.
    async fn sum_all(&self) -> Result<i64, StorageError>;

    /// Sum of amounts recorded at or after `since`. `0` when nothing matches.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Database`] if the query fails.
    async fn sum_since(&self, since: DateTime<Utc>) -> Result<i64, StorageError>;

    /// Records created at or after `since`, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Database`] if the query fails.
    /// Returns [`StorageError::InvalidData`] if a stored row cannot be decoded.
    async fn list_since(&self, since: DateTime<Utc>) -> Result<Vec<FeedingRecord>, StorageError>;
}
