//! Shared test utilities for cw-api integration tests.

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use cw_api::api::{api_routes, with_boundaries, AppState};
use cw_api::config::ServiceConfig;
use cw_api::logging::{Logger, LoggerHandle, SharedBuffer, Severity, Sink};
use cw_api::simulation::Simulator;
use serde_json::Value;
use std::sync::Arc;
use tower::Service;

pub const APP_NAME: &str = "cw-api-test";

/// Config pointing at no real file; tests bind in-memory sinks instead.
pub fn test_config() -> ServiceConfig {
    let mut config = ServiceConfig::default();
    config.service_name = APP_NAME.to_string();
    config
}

/// Logger writing every record at or above DEBUG into `buffer`.
pub fn capture_logger(buffer: &SharedBuffer) -> LoggerHandle {
    Logger::with_sinks(APP_NAME, Severity::Debug, vec![Sink::memory(buffer.clone())])
}

pub fn test_state(seed: u64) -> (Arc<AppState>, SharedBuffer) {
    let buffer = SharedBuffer::new();
    let logger = capture_logger(&buffer);
    let simulator = Simulator::with_seed(APP_NAME, Arc::clone(&logger), seed);
    let state = AppState::with_simulator(Arc::new(test_config()), logger, simulator);
    (Arc::new(state), buffer)
}

/// Full router plus the buffer receiving its log lines.
pub fn test_app(seed: u64) -> (Router, SharedBuffer) {
    let (state, buffer) = test_state(seed);
    (with_boundaries(api_routes(), state), buffer)
}

pub async fn get(app: &mut Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let response = app.call(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, body)
}

/// Every captured line, each parsed as exactly one JSON object.
pub fn records(buffer: &SharedBuffer) -> Vec<Value> {
    buffer
        .lines()
        .iter()
        .map(|line| {
            let value: Value = serde_json::from_str(line)
                .unwrap_or_else(|e| panic!("invalid JSON line {line:?}: {e}"));
            assert!(value.is_object(), "line is not an object: {line}");
            value
        })
        .collect()
}

/// Lines written by the request instrumentation middleware.
pub fn instrumentation_records(buffer: &SharedBuffer) -> Vec<Value> {
    records(buffer)
        .into_iter()
        .filter(|r| r.get("response_status_code").is_some())
        .collect()
}

/// Lines written by the simulation service.
pub fn simulation_records(buffer: &SharedBuffer) -> Vec<Value> {
    records(buffer)
        .into_iter()
        .filter(|r| r.get("endpoint").is_some())
        .collect()
}

pub fn has_location(record: &Value) -> bool {
    ["name", "module", "funcName", "pathname", "lineno"]
        .iter()
        .all(|k| record.get(*k).is_some())
}
