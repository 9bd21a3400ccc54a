//! Simulation endpoint handlers.

use crate::api::{AppError, AppState, SuccessResponse};
use axum::extract::{Query, State};
use axum::Json;
use std::sync::Arc;

/// GET /api/v1/cw/success
pub async fn success(State(state): State<Arc<AppState>>) -> Json<SuccessResponse> {
    Json(state.simulator.process_success())
}

/// GET /api/v1/cw/error?error_type=internal|not_found|random|critical
///
/// The query is read as raw pairs so that no query string is rejected before
/// the simulator sees it. A repeated `error_type` is joined with commas,
/// which no selector matches, and gets the structured INVALID_INPUT body.
pub async fn error(
    State(state): State<Arc<AppState>>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<SuccessResponse>, AppError> {
    let response = state
        .simulator
        .process_error(error_type(&pairs).as_deref())?;
    Ok(Json(response))
}

fn error_type(pairs: &[(String, String)]) -> Option<String> {
    let values: Vec<&str> = pairs
        .iter()
        .filter(|(key, _)| key == "error_type")
        .map(|(_, value)| value.as_str())
        .collect();
    (!values.is_empty()).then(|| values.join(","))
}
