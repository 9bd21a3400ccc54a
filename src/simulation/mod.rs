//! Simulated outcomes that drive log emission
//!
//! The success path always logs one INFO record. The error path maps a
//! selector to a failure of matching severity, or for `random` flips a coin
//! between a server error and a success. Unknown selectors are rejected
//! before anything is logged.

use crate::api::types::{ErrorResponse, SuccessResponse};
use crate::log_event;
use crate::logging::{generate_request_id, LoggerHandle, Severity};
use axum::http::StatusCode;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::ops::RangeInclusive;
use std::str::FromStr;
use std::sync::{Mutex, PoisonError};
use thiserror::Error;

pub const SUCCESS_ENDPOINT: &str = "/api/v1/cw/success";
pub const ERROR_ENDPOINT: &str = "/api/v1/cw/error";

const FAST_DURATION_MS: RangeInclusive<u64> = 50..=200;
const SLOW_DURATION_MS: RangeInclusive<u64> = 300..=800;

/// Failure category requested through `error_type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorKind {
    #[default]
    Internal,
    NotFound,
    Random,
    Critical,
}

impl ErrorKind {
    pub const SELECTORS: [&'static str; 4] = ["internal", "not_found", "random", "critical"];
}

impl FromStr for ErrorKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "internal" => Ok(ErrorKind::Internal),
            "not_found" => Ok(ErrorKind::NotFound),
            "random" => Ok(ErrorKind::Random),
            "critical" => Ok(ErrorKind::Critical),
            other => Err(other.to_string()),
        }
    }
}

/// Expected, structured failure: status code plus the body to return.
#[derive(Error, Debug, Clone)]
#[error("{status}: {}", body.message)]
pub struct SimulationError {
    pub status: StatusCode,
    pub body: ErrorResponse,
}

/// Produces simulated outcomes and logs them.
pub struct Simulator {
    app_name: String,
    logger: LoggerHandle,
    rng: Mutex<StdRng>,
}

impl Simulator {
    pub fn new(app_name: impl Into<String>, logger: LoggerHandle) -> Self {
        Self::with_rng(app_name, logger, StdRng::from_entropy())
    }

    /// Deterministic outcomes for a given seed.
    pub fn with_seed(app_name: impl Into<String>, logger: LoggerHandle, seed: u64) -> Self {
        Self::with_rng(app_name, logger, StdRng::seed_from_u64(seed))
    }

    fn with_rng(app_name: impl Into<String>, logger: LoggerHandle, rng: StdRng) -> Self {
        Self {
            app_name: app_name.into(),
            logger,
            rng: Mutex::new(rng),
        }
    }

    fn duration_ms(&self, range: RangeInclusive<u64>) -> u64 {
        self.rng
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .gen_range(range)
    }

    fn coin_flip(&self) -> bool {
        self.rng
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .gen_bool(0.5)
    }

    /// Always succeeds with one INFO record.
    pub fn process_success(&self) -> SuccessResponse {
        let request_id = generate_request_id();
        let duration_ms = self.duration_ms(FAST_DURATION_MS);
        self.succeed(
            "Request processed successfully.",
            "Operation successful",
            SUCCESS_ENDPOINT,
            request_id,
            duration_ms,
        )
    }

    /// Outcome for `error_type`; `None` selects `internal`.
    pub fn process_error(&self, selector: Option<&str>) -> Result<SuccessResponse, SimulationError> {
        let request_id = generate_request_id();
        let duration_ms = self.duration_ms(SLOW_DURATION_MS);

        let kind = match selector.map(str::parse::<ErrorKind>).transpose() {
            Ok(kind) => kind.unwrap_or_default(),
            Err(selector) => {
                return Err(self.failure(
                    StatusCode::BAD_REQUEST,
                    format!(
                        "Invalid error type: '{}'. Allowed types: {}.",
                        selector,
                        ErrorKind::SELECTORS.join(", ")
                    ),
                    "INVALID_INPUT",
                    "INVALID_ERROR_TYPE",
                    request_id,
                    duration_ms,
                ));
            }
        };

        let (severity, error) = match kind {
            ErrorKind::NotFound => (
                Severity::Warning,
                self.failure(
                    StatusCode::NOT_FOUND,
                    "Resource not found.".to_string(),
                    "NOT_FOUND",
                    "RESOURCE_NOT_FOUND",
                    request_id,
                    duration_ms,
                ),
            ),
            ErrorKind::Random if self.coin_flip() => (
                Severity::Error,
                self.failure(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "A random error occurred while processing the request.".to_string(),
                    "FAILURE",
                    "SIMULATED_RANDOM_ERROR",
                    request_id,
                    duration_ms,
                ),
            ),
            ErrorKind::Random => {
                let duration_ms = self.duration_ms(FAST_DURATION_MS);
                return Ok(self.succeed(
                    "Random request succeeded (despite being the error endpoint).",
                    "Random operation successful",
                    ERROR_ENDPOINT,
                    request_id,
                    duration_ms,
                ));
            }
            ErrorKind::Critical => (
                Severity::Critical,
                self.failure(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "A simulated critical error occurred.".to_string(),
                    "CRITICAL_FAILURE",
                    "SIMULATED_CRITICAL_ERROR",
                    request_id,
                    duration_ms,
                ),
            ),
            ErrorKind::Internal => (
                Severity::Error,
                self.failure(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An unexpected internal error occurred while processing the request."
                        .to_string(),
                    "FAILURE",
                    "INTERNAL_SERVER_ERROR",
                    request_id,
                    duration_ms,
                ),
            ),
        };

        log_event!(
            self.logger,
            severity,
            error.body.message.as_str(),
            app_name = error.body.app_name.as_str(),
            request_id = error.body.request_id.as_str(),
            status = error.body.status.as_str(),
            error_code = error.body.error_code.as_str(),
            endpoint = error.body.endpoint.as_str(),
            duration_ms = error.body.duration_ms,
        );

        Err(error)
    }

    fn succeed(
        &self,
        log_message: &str,
        message: &str,
        endpoint: &str,
        request_id: String,
        duration_ms: u64,
    ) -> SuccessResponse {
        log_event!(
            self.logger,
            Severity::Info,
            log_message,
            app_name = self.app_name.as_str(),
            request_id = request_id.as_str(),
            status = "SUCCESS",
            endpoint = endpoint,
            duration_ms = duration_ms,
        );

        SuccessResponse {
            message: message.to_string(),
            request_id,
            app_name: self.app_name.clone(),
            status: "SUCCESS".to_string(),
            endpoint: endpoint.to_string(),
            duration_ms,
        }
    }

    fn failure(
        &self,
        status: StatusCode,
        message: String,
        outcome: &str,
        error_code: &str,
        request_id: String,
        duration_ms: u64,
    ) -> SimulationError {
        SimulationError {
            status,
            body: ErrorResponse {
                message,
                request_id,
                app_name: self.app_name.clone(),
                status: outcome.to_string(),
                error_code: error_code.to_string(),
                endpoint: ERROR_ENDPOINT.to_string(),
                duration_ms,
                details: None,
            },
        }
    }
}
