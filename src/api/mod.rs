//! # HTTP API
//!
//! Thin endpoints whose only job is to trigger log emission.
//!
//! ## Endpoints
//!
//! - `GET /health` - Liveness, never instrumented
//! - `GET /api/v1/cw/success` - Simulated success, one INFO record
//! - `GET /api/v1/cw/error?error_type=...` - Simulated failure of the selected kind
//! - `GET /metrics` - Prometheus exposition, never instrumented
//!
//! ## Layering
//!
//! From the outside in, every request passes through:
//! 1. request instrumentation (one record per request, after the response)
//! 2. the error boundary (unhandled failures become a correlation-id body)
//! 3. panic catching (panics become unhandled failures)
//! 4. the route handler or the not-found fallback
//!
//! ## Example
//!
//! ```no_run
//! use cw_api::api::{AppState, create_router};
//! use cw_api::config::ServiceConfig;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ServiceConfig::default();
//! let logger = cw_api::logging::init(&config)?;
//! let state = Arc::new(AppState::new(Arc::new(config), logger));
//!
//! let app = create_router(state);
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:8000").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

pub mod error;
mod fallback;
mod health;
mod simulation;
pub mod types;

pub use error::{AppError, UnhandledFailure};
pub use types::*;

use crate::config::ServiceConfig;
use crate::logging::{LoggerHandle, RequestLogContext};
use crate::metrics::PrometheusHandle;
use crate::simulation::Simulator;
use axum::{middleware, routing::get, Router};
use std::sync::Arc;
use tower_http::catch_panic::CatchPanicLayer;

/// Shared application state accessible to all handlers.
pub struct AppState {
    pub config: Arc<ServiceConfig>,
    pub logger: LoggerHandle,
    pub simulator: Simulator,
    pub prometheus: PrometheusHandle,
}

impl AppState {
    /// Create application state around an initialized logger.
    pub fn new(config: Arc<ServiceConfig>, logger: LoggerHandle) -> Self {
        let simulator = Simulator::new(config.service_name.clone(), Arc::clone(&logger));
        Self::with_simulator(config, logger, simulator)
    }

    pub fn with_simulator(
        config: Arc<ServiceConfig>,
        logger: LoggerHandle,
        simulator: Simulator,
    ) -> Self {
        Self {
            config,
            logger,
            simulator,
            prometheus: crate::metrics::handle_or_detached(),
        }
    }

    pub fn request_log_context(&self) -> RequestLogContext {
        RequestLogContext {
            logger: Arc::clone(&self.logger),
            app_name: Arc::from(self.config.service_name.as_str()),
        }
    }
}

/// Service routes without middleware or fallback.
pub fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health::handle))
        .route("/metrics", get(crate::metrics::handler::metrics_handler))
        .route("/api/v1/cw/success", get(simulation::success))
        .route("/api/v1/cw/error", get(simulation::error))
}

/// Attach the not-found fallback, panic catching, the error boundary and
/// request instrumentation to `routes`.
pub fn with_boundaries(routes: Router<Arc<AppState>>, state: Arc<AppState>) -> Router {
    routes
        .fallback(fallback::handle)
        .layer(CatchPanicLayer::custom(error::panic_response))
        .layer(middleware::from_fn_with_state(
            Arc::clone(&state),
            error::boundary,
        ))
        .layer(middleware::from_fn_with_state(
            state.request_log_context(),
            crate::logging::middleware::instrument,
        ))
        .with_state(state)
}

/// Create the main API router with all endpoints configured.
pub fn create_router(state: Arc<AppState>) -> Router {
    with_boundaries(api_routes(), state)
}
