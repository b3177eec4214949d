use super::{LikeStore, StorageResult};
use crate::imdb::ImdbId;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

/// Process-local counter store for development and tests.
///
/// Counts live only as long as the process.
#[derive(Debug, Default)]
pub struct InMemoryLikeStore {
    counts: RwLock<HashMap<String, i64>>,
}

impl InMemoryLikeStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LikeStore for InMemoryLikeStore {
    async fn get(&self, id: &ImdbId) -> StorageResult<i64> {
        Ok(self.counts.read().await.get(id.as_str()).copied().unwrap_or(0))
    }

    async fn increment_or_create(&self, id: &ImdbId) -> StorageResult<i64> {
        let mut counts = self.counts.write().await;
        let likes = counts.entry(id.as_str().to_string()).or_insert(0);
        *likes += 1;
        debug!(imdb_id = %id, likes = *likes, "Incremented in-memory counter");
        Ok(*likes)
    }

    async fn get_bulk(&self, ids: &[ImdbId]) -> StorageResult<HashMap<String, i64>> {
        let counts = self.counts.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| counts.get(id.as_str()).map(|likes| (id.as_str().to_string(), *likes)))
            .collect())
    }

    async fn get_total(&self) -> StorageResult<i64> {
        Ok(self.counts.read().await.values().sum())
    }
}
