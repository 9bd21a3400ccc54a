//! Request instrumentation middleware and request ID generation

use super::logger::LoggerHandle;
use super::severity::Severity;
use axum::extract::{ConnectInfo, Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::Response;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

/// Paths that never produce an instrumentation record.
///
/// `/docs`, `/redoc` and `/openapi.json` are reserved for API documentation
/// and are not mounted. A request to one of them still reaches the fallback
/// and gets its INFO "Endpoint not found." record, but no per-request line.
pub const EXCLUDED_PATHS: [&str; 5] = ["/health", "/docs", "/redoc", "/openapi.json", "/metrics"];

/// Generate a new request ID using UUID v4
///
/// Returns a unique correlation ID that links a client-visible response to
/// the log lines written for it.
///
/// # Examples
///
/// ```
/// use cw_api::logging::generate_request_id;
///
/// let request_id = generate_request_id();
/// assert!(!request_id.is_empty());
/// ```
pub fn generate_request_id() -> String {
    Uuid::new_v4().to_string()
}

/// Severity of the per-request record, chosen from the status class.
pub fn severity_for_status(status: StatusCode) -> Severity {
    match status.as_u16() {
        400..=499 => Severity::Warning,
        500.. => Severity::Error,
        _ => Severity::Info,
    }
}

fn message_for(severity: Severity) -> &'static str {
    match severity {
        Severity::Warning => "Client request completed with a warning.",
        Severity::Error => "Client request completed with a server error.",
        _ => "HTTP request processed.",
    }
}

/// State for [`instrument`].
#[derive(Debug, Clone)]
pub struct RequestLogContext {
    pub logger: LoggerHandle,
    pub app_name: Arc<str>,
}

/// Emit one record per request after the downstream handler completes.
///
/// Latency is measured in whole milliseconds. The client address comes from
/// [`ConnectInfo`] when the server was started with it, else `"unknown"`.
pub async fn instrument(
    State(ctx): State<RequestLogContext>,
    request: Request,
    next: Next,
) -> Response {
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let client_ip = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string());

    let start = Instant::now();
    let response = next.run(request).await;
    let elapsed = start.elapsed();

    if EXCLUDED_PATHS.contains(&path.as_str()) {
        return response;
    }

    let status = response.status();
    let process_time_ms = elapsed.as_millis() as u64;
    crate::metrics::record_request(status, elapsed);

    let severity = severity_for_status(status);
    crate::log_event!(
        ctx.logger,
        severity,
        message_for(severity),
        app_name = &*ctx.app_name,
        request_method = method.as_str(),
        request_path = path.as_str(),
        response_status_code = status.as_u16(),
        process_time_ms = process_time_ms,
        client_ip = client_ip.as_str(),
    );

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_request_id_format() {
        let id = generate_request_id();
        // UUID v4 format: xxxxxxxx-xxxx-4xxx-yxxx-xxxxxxxxxxxx
        assert_eq!(id.len(), 36);
        assert_eq!(id.chars().filter(|&c| c == '-').count(), 4);
    }

    #[test]
    fn test_generate_request_id_uniqueness() {
        let id1 = generate_request_id();
        let id2 = generate_request_id();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_severity_for_status_classes() {
        assert_eq!(severity_for_status(StatusCode::OK), Severity::Info);
        assert_eq!(severity_for_status(StatusCode::MOVED_PERMANENTLY), Severity::Info);
        assert_eq!(severity_for_status(StatusCode::BAD_REQUEST), Severity::Warning);
        assert_eq!(severity_for_status(StatusCode::NOT_FOUND), Severity::Warning);
        assert_eq!(
            severity_for_status(StatusCode::INTERNAL_SERVER_ERROR),
            Severity::Error
        );
        assert_eq!(
            severity_for_status(StatusCode::SERVICE_UNAVAILABLE),
            Severity::Error
        );
    }

    #[test]
    fn test_excluded_paths_cover_health_and_docs() {
        for path in ["/health", "/docs", "/redoc", "/openapi.json"] {
            assert!(EXCLUDED_PATHS.contains(&path));
        }
        assert!(!EXCLUDED_PATHS.contains(&"/api/v1/cw/success"));
    }
}
