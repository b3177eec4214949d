use crate::imdb::InvalidImdbId;
use crate::storage::StorageError;
use axum::{
    Json,
    extract::rejection::{PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};

/// Every failure a request can end in.
///
/// Services and handlers return this; [`IntoResponse`] below is the only
/// place where error kinds become status codes and bodies.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    InvalidImdbId(#[from] InvalidImdbId),

    #[error("{0}")]
    BadRequest(String),

    #[error("Route not found")]
    NotFound,

    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("storage unavailable: {0}")]
    StorageUnavailable(#[from] StorageError),

    #[error("unexpected: {0}")]
    Unexpected(String),
}

pub type AppResult<T> = Result<T, AppError>;

/// Error envelope shared by every endpoint
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: ErrorBody,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub message: String,
    pub status: u16,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidImdbId(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            AppError::StorageUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    // Server-side details stay in the logs.
    fn public_message(&self) -> String {
        match self {
            AppError::StorageUnavailable(_) => "Like storage is temporarily unavailable".to_string(),
            AppError::Unexpected(_) => "Internal Server Error".to_string(),
            other => other.to_string(),
        }
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            AppError::StorageUnavailable(e) => error!(error = %e, "Storage error"),
            AppError::Unexpected(detail) => error!(detail = %detail, "Unexpected error"),
            other => warn!(status = status.as_u16(), "{}", other),
        }

        let body = Json(ErrorResponse {
            success: false,
            error: ErrorBody {
                message: self.public_message(),
                status: status.as_u16(),
            },
        });

        (status, body).into_response()
    }
}
