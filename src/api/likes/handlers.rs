use crate::api::models::*;
use crate::error::AppResult;
use crate::services::{MovieLikes, TotalLikes};
use axum::{
    extract::{
        rejection::{PathRejection, QueryRejection},
        Path, Query, State,
    },
    Json,
};
use tracing::info;

pub async fn get_movie_likes_handler(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> AppResult<Json<ApiResponse<MovieLikes>>> {
    let Path(id) = path?;
    let likes = state.likes.get_movie_likes(&id).await?;

    Ok(Json(ApiResponse::with_message(likes, "Likes retrieved")))
}

pub async fn like_movie_handler(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> AppResult<Json<ApiResponse<MovieLikes>>> {
    let Path(id) = path?;
    info!(imdb_id = %id, "Liking movie");

    let likes = state.likes.increment_like(&id).await?;

    Ok(Json(ApiResponse::with_message(likes, "Like added")))
}

pub async fn total_likes_handler(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<TotalLikes>>> {
    let total = state.likes.get_total_likes().await?;

    Ok(Json(ApiResponse::with_message(total, "Total likes calculated")))
}

pub async fn bulk_likes_handler(
    State(state): State<AppState>,
    query: Result<Query<BulkLikesQuery>, QueryRejection>,
) -> AppResult<Json<ApiResponse<Vec<MovieLikes>>>> {
    let Query(query) = query?;
    let ids = query.id_list();
    let likes = state.likes.get_bulk_likes(&ids).await?;

    info!(requested = ids.len(), returned = likes.len(), "Bulk likes lookup");

    let count = likes.len();
    Ok(Json(ApiResponse::with_count(likes, count)))
}
