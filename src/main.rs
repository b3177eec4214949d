mod api;
mod config;
mod error;
mod imdb;
mod services;
mod storage;

use crate::api::AppState;
use crate::config::{AppConfig, StorageBackend};
use crate::services::{LikeService, MovieCatalog};
use crate::storage::{InMemoryLikeStore, LikeStore, PgLikeStore};
use anyhow::Context;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_thread_ids(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    info!("🚀 Starting {}", api::SERVICE_NAME);

    // Load configuration
    let config = AppConfig::load()?;
    info!("📋 Configuration loaded");
    info!("   - Environment: {}", config.server.environment);
    info!("   - Docker: {}", config.server.running_in_docker);
    info!("   - Storage: {}", config.storage.backend);
    info!("   - Server: {}", config.server.bind_addr());
    info!(
        "   - Upstream API key: {}",
        if config.server.api_key.is_empty() { "not set" } else { "set" }
    );

    // Initialize like storage
    info!("💾 Initializing like storage...");
    let (store, pg_store): (Arc<dyn LikeStore>, Option<PgLikeStore>) = match config.storage.backend {
        StorageBackend::Postgres => {
            let pg = PgLikeStore::connect(&config.database)
                .await
                .context("Failed to connect to PostgreSQL")?;
            pg.migrate().await.context("Failed to prepare movie_likes table")?;
            let store: Arc<dyn LikeStore> = Arc::new(pg.clone());
            (store, Some(pg))
        }
        StorageBackend::Memory => {
            warn!("Using in-memory like storage; counts are lost on restart");
            let store: Arc<dyn LikeStore> = Arc::new(InMemoryLikeStore::new());
            (store, None)
        }
    };
    info!("✅ Like storage ready");

    // Create application state
    let movies = MovieCatalog::seeded();
    info!("🎬 Movie catalog seeded ({} movies)", movies.count());

    let state = AppState {
        likes: LikeService::new(store),
        movies,
    };

    let app = api::router(state);

    // Start server
    let addr = config.server.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    info!("🌐 Server listening on http://{}", addr);
    info!("");
    info!("📡 Available endpoints:");
    info!("   GET  /health                  - Health check");
    info!("   GET  /api/movies              - List movies");
    info!("   GET  /api/movies/{{id}}/likes   - Likes for a movie");
    info!("   POST /api/movies/{{id}}/like    - Like a movie");
    info!("   GET  /api/likes?ids=a,b       - Likes for several movies");
    info!("   GET  /api/likes/total         - Total likes");
    info!("");
    info!("✨ Server is ready to accept requests!");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(pg) = pg_store {
        info!("💾 Closing PostgreSQL pool...");
        pg.close().await;
    }

    info!("👋 Server shutting down gracefully");

    Ok(())
}

/// Graceful shutdown handler
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("🛑 Shutdown signal received");
}
