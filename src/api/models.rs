use crate::services::{LikeService, MovieCatalog};
use serde::{Deserialize, Serialize};

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub likes: LikeService,
    pub movies: MovieCatalog,
}

/// Success envelope
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
}

impl<T> ApiResponse<T> {
    pub fn with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data,
            message: Some(message.into()),
            count: None,
        }
    }

    pub fn with_count(data: T, count: usize) -> Self {
        Self {
            success: true,
            data,
            message: None,
            count: Some(count),
        }
    }
}

/// Query for `GET /api/likes`
#[derive(Debug, Deserialize)]
pub struct BulkLikesQuery {
    /// Comma-separated IMDb ids
    #[serde(default)]
    pub ids: String,
}

impl BulkLikesQuery {
    pub fn id_list(&self) -> Vec<&str> {
        self.ids
            .split(',')
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .collect()
    }
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    pub service: String,
}
