//! Health check endpoint handler.

use crate::api::{AppState, HealthResponse};
use crate::config::SERVICE_VERSION;
use axum::{extract::State, Json};
use std::sync::Arc;

/// GET /health - Always ok; the instrumentation middleware skips this path.
pub async fn handle(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        service_name: state.config.service_name.clone(),
        version: SERVICE_VERSION.to_string(),
    })
}
