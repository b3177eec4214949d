//! Store doubles for service and router tests.

use super::{InMemoryLikeStore, LikeStore, StorageError, StorageResult};
use crate::imdb::ImdbId;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

/// In-memory store that counts every call made to it.
#[derive(Debug, Default)]
pub struct CountingStore {
    inner: InMemoryLikeStore,
    calls: AtomicUsize,
}

impl CountingStore {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn hit(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl LikeStore for CountingStore {
    async fn get(&self, id: &ImdbId) -> StorageResult<i64> {
        self.hit();
        self.inner.get(id).await
    }

    async fn increment_or_create(&self, id: &ImdbId) -> StorageResult<i64> {
        self.hit();
        self.inner.increment_or_create(id).await
    }

    async fn get_bulk(&self, ids: &[ImdbId]) -> StorageResult<HashMap<String, i64>> {
        self.hit();
        self.inner.get_bulk(ids).await
    }

    async fn get_total(&self) -> StorageResult<i64> {
        self.hit();
        self.inner.get_total().await
    }
}

/// Store whose pool never hands out a connection.
#[derive(Debug, Default)]
pub struct FailingStore;

fn timed_out<T>() -> StorageResult<T> {
    Err(StorageError::Database(sqlx::Error::PoolTimedOut))
}

#[async_trait]
impl LikeStore for FailingStore {
    async fn get(&self, _id: &ImdbId) -> StorageResult<i64> {
        timed_out()
    }

    async fn increment_or_create(&self, _id: &ImdbId) -> StorageResult<i64> {
        timed_out()
    }

    async fn get_bulk(&self, _ids: &[ImdbId]) -> StorageResult<HashMap<String, i64>> {
        timed_out()
    }

    async fn get_total(&self) -> StorageResult<i64> {
        timed_out()
    }
}
