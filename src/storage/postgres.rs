use super::{LikeStore, StorageResult};
use crate::config::DatabaseConfig;
use crate::imdb::ImdbId;
use async_trait::async_trait;
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, info};

const CREATE_TABLE_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS movie_likes (
    id    TEXT PRIMARY KEY,
    likes INTEGER NOT NULL DEFAULT 0 CHECK (likes >= 0)
)
"#;

const SELECT_LIKES_SQL: &str = "SELECT likes FROM movie_likes WHERE id = $1";

// Single statement so concurrent likes for the same id serialize on the row lock.
const UPSERT_LIKE_SQL: &str = r#"
INSERT INTO movie_likes (id, likes)
VALUES ($1, 1)
ON CONFLICT (id)
DO UPDATE SET likes = movie_likes.likes + 1
RETURNING likes
"#;

const SELECT_BULK_SQL: &str = "SELECT id, likes FROM movie_likes WHERE id = ANY($1)";

const SELECT_TOTAL_SQL: &str = "SELECT COALESCE(SUM(likes), 0)::BIGINT FROM movie_likes";

/// PostgreSQL-backed like counters.
///
/// Every operation borrows one pooled connection and hands it back when the
/// guard drops, whether the query succeeded or not.
#[derive(Debug, Clone)]
pub struct PgLikeStore {
    pool: PgPool,
}

impl PgLikeStore {
    /// Open a bounded pool against the configured database.
    pub async fn connect(config: &DatabaseConfig) -> StorageResult<Self> {
        info!(
            host = %config.host,
            port = config.port,
            database = %config.name,
            user = %config.user,
            max_connections = config.max_connections,
            "Connecting to PostgreSQL"
        );

        let options = PgConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .database(&config.name)
            .username(&config.user)
            .password(&config.password);

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_millis(config.acquire_timeout_ms))
            .idle_timeout(Duration::from_millis(config.idle_timeout_ms))
            .connect_with(options)
            .await?;

        Ok(Self::from_pool(pool))
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create the counter table if it does not exist yet.
    pub async fn migrate(&self) -> StorageResult<()> {
        sqlx::query(CREATE_TABLE_SQL).execute(&self.pool).await?;
        info!("movie_likes table ready");
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl LikeStore for PgLikeStore {
    async fn get(&self, id: &ImdbId) -> StorageResult<i64> {
        let mut conn = self.pool.acquire().await?;
        let likes: Option<i32> = sqlx::query_scalar(SELECT_LIKES_SQL)
            .bind(id.as_str())
            .fetch_optional(&mut *conn)
            .await?;

        Ok(likes.map(i64::from).unwrap_or(0))
    }

    async fn increment_or_create(&self, id: &ImdbId) -> StorageResult<i64> {
        let mut conn = self.pool.acquire().await?;
        let likes: i32 = sqlx::query_scalar(UPSERT_LIKE_SQL)
            .bind(id.as_str())
            .fetch_one(&mut *conn)
            .await?;

        debug!(imdb_id = %id, likes, "Upserted like");
        Ok(i64::from(likes))
    }

    async fn get_bulk(&self, ids: &[ImdbId]) -> StorageResult<HashMap<String, i64>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let keys: Vec<String> = ids.iter().map(|id| id.as_str().to_string()).collect();
        let mut conn = self.pool.acquire().await?;
        let rows: Vec<(String, i32)> = sqlx::query_as(SELECT_BULK_SQL)
            .bind(keys)
            .fetch_all(&mut *conn)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(id, likes)| (id, i64::from(likes)))
            .collect())
    }

    async fn get_total(&self) -> StorageResult<i64> {
        let mut conn = self.pool.acquire().await?;
        let total: i64 = sqlx::query_scalar(SELECT_TOTAL_SQL)
            .fetch_one(&mut *conn)
            .await?;

        Ok(total)
    }
}

/// These run against a real database: `DATABASE_URL=postgres://... cargo test -- --ignored`.
/// Each test uses its own ids and deletes them when done.
#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    async fn store() -> PgLikeStore {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for PostgreSQL tests");
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(&url)
            .await
            .expect("connect to test database");
        let store = PgLikeStore::from_pool(pool);
        store.migrate().await.unwrap();
        store
    }

    async fn reset(store: &PgLikeStore, ids: &[&str]) {
        let keys: Vec<String> = ids.iter().map(|s| s.to_string()).collect();
        sqlx::query("DELETE FROM movie_likes WHERE id = ANY($1)")
            .bind(keys)
            .execute(&store.pool)
            .await
            .unwrap();
    }

    fn id(raw: &str) -> ImdbId {
        ImdbId::parse(raw).unwrap()
    }

    #[tokio::test]
    #[ignore = "requires DATABASE_URL"]
    async fn first_increment_creates_row_with_one() {
        let store = store().await;
        reset(&store, &["tt7000001"]).await;
        let movie = id("tt7000001");

        assert_eq!(store.get(&movie).await.unwrap(), 0);
        assert_eq!(store.increment_or_create(&movie).await.unwrap(), 1);
        assert_eq!(store.increment_or_create(&movie).await.unwrap(), 2);
        assert_eq!(store.increment_or_create(&movie).await.unwrap(), 3);
        assert_eq!(store.get(&movie).await.unwrap(), 3);

        reset(&store, &["tt7000001"]).await;
    }

    #[tokio::test]
    #[ignore = "requires DATABASE_URL"]
    async fn get_does_not_create_rows() {
        let store = store().await;
        reset(&store, &["tt7000002"]).await;

        assert_eq!(store.get(&id("tt7000002")).await.unwrap(), 0);
        assert!(store.get_bulk(&[id("tt7000002")]).await.unwrap().is_empty());
    }

    #[tokio::test]
    #[ignore = "requires DATABASE_URL"]
    async fn bulk_skips_missing_rows_and_total_includes_counts() {
        let store = store().await;
        let ids = ["tt7000003", "tt7000004"];
        reset(&store, &ids).await;

        let before = store.get_total().await.unwrap();
        store.increment_or_create(&id("tt7000003")).await.unwrap();

        let counts = store.get_bulk(&[id("tt7000003"), id("tt7000004")]).await.unwrap();
        assert_eq!(counts.get("tt7000003"), Some(&1));
        assert!(!counts.contains_key("tt7000004"));
        assert_eq!(store.get_total().await.unwrap(), before + 1);

        reset(&store, &ids).await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    #[ignore = "requires DATABASE_URL"]
    async fn concurrent_upserts_do_not_lose_updates() {
        let store = Arc::new(store().await);
        reset(&store, &["tt7000005"]).await;
        let movie = id("tt7000005");

        let tasks: Vec<_> = (0..50)
            .map(|_| {
                let store = store.clone();
                let movie = movie.clone();
                tokio::spawn(async move { store.increment_or_create(&movie).await.unwrap() })
            })
            .collect();
        for task in tasks {
            task.await.unwrap();
        }

        assert_eq!(store.get(&movie).await.unwrap(), 50);
        reset(&store, &["tt7000005"]).await;
    }
}
