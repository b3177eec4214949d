use crate::api::likes::handlers::{
    bulk_likes_handler, get_movie_likes_handler, like_movie_handler, total_likes_handler,
};
use crate::api::models::AppState;
use axum::{
    routing::{get, post},
    Router,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/movies/{id}/likes", get(get_movie_likes_handler))
        .route("/api/movies/{id}/like", post(like_movie_handler))
        .route("/api/likes", get(bulk_likes_handler))
        .route("/api/likes/total", get(total_likes_handler))
}
