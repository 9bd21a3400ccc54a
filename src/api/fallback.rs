//! Handler for unmatched routes.

use crate::api::{AppState, NotFoundResponse};
use crate::log_event;
use crate::logging::{format_timestamp, generate_request_id, Severity};
use axum::extract::State;
use axum::http::{StatusCode, Uri};
use axum::Json;
use chrono::Utc;
use std::sync::Arc;

const NOT_FOUND_MESSAGE: &str = "The endpoint you are trying to reach does not exist.";

/// Log one INFO record and return a structured 404 body.
pub async fn handle(
    State(state): State<Arc<AppState>>,
    uri: Uri,
) -> (StatusCode, Json<NotFoundResponse>) {
    let body = NotFoundResponse {
        app_name: state.config.service_name.clone(),
        request_id: generate_request_id(),
        error_type: "NOT_FOUND".to_string(),
        error_message: NOT_FOUND_MESSAGE.to_string(),
        status_code: StatusCode::NOT_FOUND.as_u16(),
        timestamp: format_timestamp(&Utc::now()),
        request_path: uri.to_string(),
    };

    log_event!(
        state.logger,
        Severity::Info,
        "Endpoint not found.",
        app_name = body.app_name.as_str(),
        request_id = body.request_id.as_str(),
        error_type = body.error_type.as_str(),
        error_message = body.error_message.as_str(),
        status_code = body.status_code,
        request_path = body.request_path.as_str(),
    );

    (StatusCode::NOT_FOUND, Json(body))
}
