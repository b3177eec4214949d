pub mod memory;
pub mod postgres;
#[cfg(test)]
pub mod testing;

pub use memory::InMemoryLikeStore;
pub use postgres::PgLikeStore;

use crate::imdb::ImdbId;
use async_trait::async_trait;
use std::collections::HashMap;
use thiserror::Error;

/// Failure talking to the counter store
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Persistent per-movie like counters.
///
/// A movie that was never liked has an implicit count of zero; reads never
/// create rows.
#[async_trait]
pub trait LikeStore: Send + Sync + 'static {
    /// Stored count for `id`, or 0 when no row exists.
    async fn get(&self, id: &ImdbId) -> StorageResult<i64>;

    /// Atomically create the row with 1 or add 1 to it. Returns the new count.
    async fn increment_or_create(&self, id: &ImdbId) -> StorageResult<i64>;

    /// Counts for the rows that exist. Missing ids are absent from the map.
    async fn get_bulk(&self, ids: &[ImdbId]) -> StorageResult<HashMap<String, i64>>;

    /// Sum of all counts, 0 for an empty store.
    async fn get_total(&self) -> StorageResult<i64>;
}
