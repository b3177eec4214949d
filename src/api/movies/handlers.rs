use crate::api::models::*;
use crate::services::Movie;
use axum::{extract::State, Json};
use tracing::debug;

pub async fn list_movies_handler(State(state): State<AppState>) -> Json<ApiResponse<Vec<Movie>>> {
    let movies = state.movies.all().to_vec();
    debug!(count = movies.len(), "Listing movies");

    Json(ApiResponse::with_count(movies, state.movies.count()))
}
