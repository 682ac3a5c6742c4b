//! REST API endpoints.
//!
//! Axum-based HTTP API for competitions, competitors, betters and bets,
//! plus a websocket that streams bet events.

pub mod routes;
pub mod state;

use axum::{
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use thiserror::Error;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::storage::StoreError;
use state::AppState;

/// API error types.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Internal(String),
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
            ApiError::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        };

        if status.is_server_error() {
            tracing::error!("{}", self);
        }

        let body = ErrorResponse {
            error: ErrorDetail {
                code: code.to_string(),
                message: self.to_string(),
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(_) => ApiError::NotFound(err.to_string()),
            StoreError::BadRequest(_) | StoreError::Invalid(_) => {
                ApiError::BadRequest(err.to_string())
            }
            StoreError::Conflict(_) => ApiError::Conflict(err.to_string()),
            StoreError::Storage(_) => ApiError::Internal(err.to_string()),
        }
    }
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// CORS layer allowing `origin`, or any origin for "*".
pub fn cors_layer(origin: &str) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    match origin {
        "*" => layer.allow_origin(Any),
        other => match HeaderValue::from_str(other) {
            Ok(value) => layer.allow_origin(value),
            Err(_) => {
                tracing::warn!("Invalid CORS origin {:?}, allowing any", other);
                layer.allow_origin(Any)
            }
        },
    }
}

/// Build the application router.
pub fn build_router(state: AppState) -> Router {
    use routes::{betters, bets, competitions, competitors, ws};

    Router::new()
        .route("/health", get(health))
        .route(
            "/api/competitions",
            get(competitions::list_competitions).post(competitions::create_competition),
        )
        .route(
            "/api/competitions/:id",
            get(competitions::get_competition).delete(competitions::delete_competition),
        )
        .route(
            "/api/competitions/:id/metrics",
            get(competitions::competition_metrics),
        )
        .route(
            "/api/competitions/:id/bets",
            get(competitions::competition_bets),
        )
        .route(
            "/api/competitions/:id/lock",
            post(competitions::lock_competition),
        )
        .route(
            "/api/competitions/:id/competitors/:competitor_id",
            post(competitions::add_competitor),
        )
        .route(
            "/api/competitors",
            get(competitors::list_competitors).post(competitors::create_competitor),
        )
        .route(
            "/api/competitors/:id",
            get(competitors::get_competitor).delete(competitors::delete_competitor),
        )
        .route(
            "/api/betters",
            get(betters::list_betters).post(betters::create_better),
        )
        .route(
            "/api/betters/:id",
            get(betters::get_better).delete(betters::delete_better),
        )
        .route("/api/betters/:id/created", get(betters::created_by_better))
        .route("/api/bets", get(bets::list_bets).post(bets::create_bet))
        .route("/api/bets/:id", get(bets::get_bet).delete(bets::delete_bet))
        .route("/ws", get(ws::ws_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
