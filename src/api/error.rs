//! Request-level errors and the top-level error boundary
//!
//! Expected failures travel as [`AppError::Simulated`] and carry the exact
//! status and body the client receives. Anything else becomes an
//! [`UnhandledFailure`] tagged on the response; [`boundary`] converts it once
//! into an opaque body with a correlation id, logging the details server-side.

use super::types::UnhandledErrorResponse;
use super::AppState;
use crate::log_event;
use crate::logging::{generate_request_id, Severity};
use crate::simulation::SimulationError;
use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use std::any::Any;
use std::sync::Arc;
use thiserror::Error;

/// Client-facing message for unhandled failures.
pub const UNHANDLED_MESSAGE: &str = "An unexpected error occurred. Please try again later.";

/// Errors returned by route handlers.
#[derive(Error, Debug)]
pub enum AppError {
    /// Expected failure with a structured body.
    #[error(transparent)]
    Simulated(#[from] SimulationError),

    /// Anything unexpected; never shown to the client.
    ///
    /// The built-in routes only fail through [`AppError::Simulated`]. This
    /// variant is the `?` target for handlers added on top of the router,
    /// which get the same opaque 500 and ERROR record as a caught panic.
    #[error(transparent)]
    Unhandled(#[from] anyhow::Error),
}

/// Details of an unexpected failure, attached to the response for [`boundary`].
#[derive(Debug, Clone)]
pub struct UnhandledFailure {
    pub error_message: String,
    pub trace: String,
}

impl IntoResponse for UnhandledFailure {
    fn into_response(self) -> Response {
        let mut response = StatusCode::INTERNAL_SERVER_ERROR.into_response();
        response.extensions_mut().insert(self);
        response
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Simulated(err) => (err.status, Json(err.body)).into_response(),
            AppError::Unhandled(err) => UnhandledFailure {
                error_message: err.to_string(),
                trace: format!("{err:?}"),
            }
            .into_response(),
        }
    }
}

/// Turn a caught panic into an unhandled failure.
pub fn panic_response(payload: Box<dyn Any + Send + 'static>) -> Response {
    let message = if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic payload".to_string()
    };

    UnhandledFailure {
        trace: format!("panicked: {message}"),
        error_message: message,
    }
    .into_response()
}

/// Replace any tagged unhandled failure with the opaque correlation-id body,
/// logging one ERROR record with the full trace.
pub async fn boundary(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    let request_path = request.uri().to_string();
    let mut response = next.run(request).await;

    let Some(failure) = response.extensions_mut().remove::<UnhandledFailure>() else {
        return response;
    };

    let request_id = generate_request_id();
    log_event!(
        state.logger,
        Severity::Error,
        "Unhandled exception",
        app_name = state.config.service_name.as_str(),
        request_id = request_id.as_str(),
        error_type = "UNHANDLED_EXCEPTION",
        error_message = failure.error_message.as_str(),
        status_code = StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
        request_path = request_path.as_str(),
        exception = failure.trace.as_str(),
    );

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(UnhandledErrorResponse {
            message: UNHANDLED_MESSAGE.to_string(),
            request_id,
        }),
    )
        .into_response()
}
