use crate::error::{AppError, AppResult};
use crate::imdb::ImdbId;
use crate::storage::LikeStore;
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::info;

/// Upper bound on ids in one bulk lookup
pub const MAX_BULK_IDS: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MovieLikes {
    pub imdb_id: ImdbId,
    pub likes: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TotalLikes {
    pub total_likes: i64,
}

/// Validates movie ids and drives the counter store.
///
/// Ids are checked before any storage call, so a malformed id never costs a
/// round-trip.
#[derive(Clone)]
pub struct LikeService {
    store: Arc<dyn LikeStore>,
}

impl LikeService {
    pub fn new(store: Arc<dyn LikeStore>) -> Self {
        Self { store }
    }

    pub async fn get_movie_likes(&self, raw_id: &str) -> AppResult<MovieLikes> {
        let imdb_id = ImdbId::parse(raw_id)?;
        let likes = self.store.get(&imdb_id).await?;

        Ok(MovieLikes { imdb_id, likes })
    }

    pub async fn increment_like(&self, raw_id: &str) -> AppResult<MovieLikes> {
        let imdb_id = ImdbId::parse(raw_id)?;
        let likes = self.store.increment_or_create(&imdb_id).await?;

        info!(imdb_id = %imdb_id, likes, "Like recorded");
        Ok(MovieLikes { imdb_id, likes })
    }

    pub async fn get_total_likes(&self) -> AppResult<TotalLikes> {
        let total_likes = self.store.get_total().await?;
        Ok(TotalLikes { total_likes })
    }

    /// Likes for several movies at once, in request order with duplicates
    /// dropped. Movies nobody liked yet come back with 0.
    pub async fn get_bulk_likes<S: AsRef<str>>(&self, raw_ids: &[S]) -> AppResult<Vec<MovieLikes>> {
        if raw_ids.is_empty() {
            return Err(AppError::BadRequest("At least one IMDb id is required".to_string()));
        }

        let mut seen = HashSet::new();
        let mut ids: Vec<ImdbId> = Vec::new();
        for raw in raw_ids {
            let id = ImdbId::parse(raw.as_ref())?;
            if !seen.insert(id.clone()) {
                continue;
            }
            if ids.len() == MAX_BULK_IDS {
                return Err(AppError::BadRequest(format!(
                    "At most {MAX_BULK_IDS} IMDb ids can be requested at once"
                )));
            }
            ids.push(id);
        }

        let counts = self.store.get_bulk(&ids).await?;

        Ok(ids
            .into_iter()
            .map(|imdb_id| {
                let likes = counts.get(imdb_id.as_str()).copied().unwrap_or(0);
                MovieLikes { imdb_id, likes }
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::testing::{CountingStore, FailingStore};

    fn service() -> (LikeService, Arc<CountingStore>) {
        let store = Arc::new(CountingStore::default());
        (LikeService::new(store.clone()), store)
    }

    #[tokio::test]
    async fn increments_then_reads_back() {
        let (service, _) = service();

        for expected in 1..=3 {
            let liked = service.increment_like("tt0362120").await.unwrap();
            assert_eq!(liked.likes, expected);
        }

        let read = service.get_movie_likes("tt0362120").await.unwrap();
        assert_eq!(read.imdb_id.as_str(), "tt0362120");
        assert_eq!(read.likes, 3);
        assert_eq!(service.get_total_likes().await.unwrap().total_likes, 3);
    }

    #[tokio::test]
    async fn unknown_movie_has_zero_likes() {
        let (service, _) = service();
        assert_eq!(service.get_movie_likes("tt0111161").await.unwrap().likes, 0);
        assert_eq!(service.get_total_likes().await.unwrap().total_likes, 0);
    }

    #[tokio::test]
    async fn malformed_id_never_reaches_storage() {
        let (service, store) = service();

        let err = service.get_movie_likes("abc123").await.unwrap_err();
        assert!(matches!(err, AppError::InvalidImdbId(_)));
        let err = service.increment_like("abc123").await.unwrap_err();
        assert!(matches!(err, AppError::InvalidImdbId(_)));
        let err = service.get_bulk_likes(&["tt0111161", "abc123"]).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidImdbId(_)));

        assert_eq!(store.calls(), 0);
    }

    #[tokio::test]
    async fn bulk_fills_zero_and_drops_duplicates() {
        let (service, _) = service();
        service.increment_like("tt0068646").await.unwrap();
        service.increment_like("tt0068646").await.unwrap();

        let likes = service
            .get_bulk_likes(&["tt0111161", "tt0068646", "tt0111161"])
            .await
            .unwrap();

        let pairs: Vec<(&str, i64)> = likes.iter().map(|l| (l.imdb_id.as_str(), l.likes)).collect();
        assert_eq!(pairs, [("tt0111161", 0), ("tt0068646", 2)]);
    }

    #[tokio::test]
    async fn bulk_rejects_empty_and_oversized_requests() {
        let (service, store) = service();

        let empty: [&str; 0] = [];
        assert!(matches!(service.get_bulk_likes(&empty).await, Err(AppError::BadRequest(_))));

        let many: Vec<String> = (0..=MAX_BULK_IDS).map(|n| format!("tt{n:07}")).collect();
        assert!(matches!(service.get_bulk_likes(&many).await, Err(AppError::BadRequest(_))));

        assert_eq!(store.calls(), 0);
    }

    #[tokio::test]
    async fn bulk_stops_at_the_first_id_past_the_limit() {
        let (service, store) = service();

        // Anything after the 101st distinct id is never parsed, so the
        // trailing malformed id does not turn this into an id error.
        let mut raw: Vec<String> = (0..=MAX_BULK_IDS).map(|n| format!("tt{n:07}")).collect();
        raw.push("abc123".to_string());

        let err = service.get_bulk_likes(&raw).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)), "{err:?}");
        assert_eq!(store.calls(), 0);
    }

    #[tokio::test]
    async fn bulk_limit_counts_distinct_ids() {
        let (service, _) = service();

        let raw: Vec<String> = (0..MAX_BULK_IDS)
            .flat_map(|n| {
                let id = format!("tt{n:07}");
                [id.clone(), id]
            })
            .collect();

        let likes = service.get_bulk_likes(&raw).await.unwrap();
        assert_eq!(likes.len(), MAX_BULK_IDS);
    }

    #[tokio::test]
    async fn storage_failure_maps_to_unavailable() {
        let service = LikeService::new(Arc::new(FailingStore));

        assert!(matches!(
            service.increment_like("tt0111161").await,
            Err(AppError::StorageUnavailable(_))
        ));
        assert!(matches!(
            service.get_total_likes().await,
            Err(AppError::StorageUnavailable(_))
        ));
    }
}
