//! REST API endpoints.
//!
//! Axum-based HTTP API exposing the league views as JSON. Every view
//! endpoint answers 200 with a status envelope; only malformed requests and
//! unknown routes produce an error body.

pub mod routes;
pub mod state;

use axum::{
    http::{HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use thiserror::Error;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::config::ServerConfig;
use state::AppState;

/// API error types.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
        };

        let body = ErrorResponse {
            error: ErrorDetail {
                code: code.to_string(),
                message: self.to_string(),
            },
        };

        (status, Json(body)).into_response()
    }
}

/// All API routes, without transport layers.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(routes::admin::health))
        .route("/api/reload", post(routes::admin::reload))
        .route("/api/managers", get(routes::views::managers))
        .route("/api/weekly-winners", get(routes::views::weekly_winners))
        .route("/api/prizes", get(routes::views::prizes))
        .route("/api/chips", get(routes::views::chips))
        .route("/api/chips/timeline", get(routes::views::chip_timeline))
        .route("/api/cup", get(routes::views::cup))
        .route("/api/prize-fund", get(routes::views::prize_fund))
        .fallback(routes::admin::not_found)
        .with_state(state)
}

/// Add CORS and, optionally, request tracing.
pub fn with_layers(router: Router, server: &ServerConfig, access_log: bool) -> Router {
    let router = router.layer(cors_layer(&server.cors_origin));
    if access_log {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    }
}

fn cors_layer(origin: &str) -> CorsLayer {
    if origin == "*" {
        return CorsLayer::permissive();
    }
    match origin.parse::<HeaderValue>() {
        Ok(value) => CorsLayer::new()
            .allow_origin(value)
            .allow_methods([Method::GET, Method::POST]),
        Err(_) => {
            warn!("Ignoring invalid CORS origin '{}'", origin);
            CorsLayer::new()
        }
    }
}
