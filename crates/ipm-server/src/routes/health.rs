//! Root and health check endpoints.

use axum::{Json, Router, extract::State, routing::get};

use crate::AppState;
use crate::json::{HealthResponse, RootResponse};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
}

async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        message: "IPM Backend API",
    })
}

async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let ips = state.service.count().await.ok();

    Json(HealthResponse {
        status: if ips.is_some() { "healthy" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        ips,
    })
}
