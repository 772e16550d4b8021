//! HTTP surface over [`aptfolio`].
//!
//! `GET /portfolio?address=0x..` returns the aggregated portfolio;
//! `GET /health` reports liveness.

use std::sync::Arc;

use aptfolio::models::validate_account_address;
use aptfolio::portfolio::PortfolioAggregator;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::error;

pub struct AppState {
    aggregator: Arc<PortfolioAggregator>,
}

impl AppState {
    pub fn new(aggregator: Arc<PortfolioAggregator>) -> Self {
        Self { aggregator }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("address query parameter is required")]
    MissingAddress,

    #[error("invalid Aptos address: {0}")]
    InvalidAddress(String),

    #[error("failed to build portfolio")]
    Internal,
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingAddress | ApiError::InvalidAddress(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[derive(Debug, Deserialize)]
pub struct PortfolioParams {
    address: Option<String>,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/portfolio", get(get_portfolio))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "aptfolio-server",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn get_portfolio(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PortfolioParams>,
) -> Result<Response, ApiError> {
    let raw = params
        .address
        .filter(|a| !a.trim().is_empty())
        .ok_or(ApiError::MissingAddress)?;
    let address =
        validate_account_address(&raw).map_err(|_| ApiError::InvalidAddress(raw.trim().to_string()))?;

    match state.aggregator.build_portfolio(&address).await {
        Ok(portfolio) => Ok(Json(portfolio).into_response()),
        Err(e) => {
            error!(address = %address, error = %format!("{e:#}"), "portfolio build failed");
            Err(ApiError::Internal)
        }
    }
}
