use crate::api::models::AppState;
use crate::api::movies::handlers::list_movies_handler;
use axum::{routing::get, Router};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/movies", get(list_movies_handler))
}
