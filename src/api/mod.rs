pub mod likes;
pub mod models;
pub mod movies;

// Re-exports
pub use models::*;

use crate::error::AppError;
use axum::{
    http::{header, Method},
    response::{IntoResponse, Redirect, Response},
    routing::get,
    Json, Router,
};
use chrono::{SecondsFormat, Utc};
use std::any::Any;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any as AnyOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

pub const SERVICE_NAME: &str = "movie-bff";

/// Full HTTP surface with middleware applied
pub fn router(state: AppState) -> Router {
    let routes = Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .merge(movies::routes())
        .merge(likes::routes())
        .method_not_allowed_fallback(method_not_allowed_handler)
        .fallback(not_found_handler)
        .with_state(state);

    with_middleware(routes)
}

fn with_middleware(routes: Router) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(AnyOrigin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    routes
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

// Liveness only; does not touch storage.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "OK".to_string(),
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        service: SERVICE_NAME.to_string(),
    })
}

async fn root_handler() -> Redirect {
    Redirect::to("/api/movies")
}

async fn not_found_handler() -> AppError {
    AppError::NotFound
}

async fn method_not_allowed_handler() -> AppError {
    AppError::MethodNotAllowed
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "handler panicked".to_string()
    };

    AppError::Unexpected(detail).into_response()
}
