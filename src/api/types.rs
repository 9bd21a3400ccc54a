//! Response payloads.

use serde::{Deserialize, Serialize};

/// Body of a successful simulated operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuccessResponse {
    pub message: String,
    pub request_id: String,
    pub app_name: String,
    pub status: String,
    pub endpoint: String,
    pub duration_ms: u64,
}

/// Body of a simulated failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub message: String,
    pub request_id: String,
    pub app_name: String,
    pub status: String,
    pub error_code: String,
    pub endpoint: String,
    pub duration_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// GET /health response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service_name: String,
    pub version: String,
}

/// Client-safe body for unhandled failures: a message and the correlation id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnhandledErrorResponse {
    pub message: String,
    pub request_id: String,
}

/// Body returned for unmatched routes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotFoundResponse {
    pub app_name: String,
    pub request_id: String,
    pub error_type: String,
    pub error_message: String,
    pub status_code: u16,
    pub timestamp: String,
    pub request_path: String,
}
