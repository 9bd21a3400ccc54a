//! Structured JSON record logging
//!
//! Every record becomes exactly one JSON object on one line, written to each
//! bound sink (console and an append-only file in production). Records are
//! `tracing` events emitted into the logger's own dispatch, where one `fmt`
//! layer per sink renders them with [`DispatchingFormatter`]. Layout depends
//! on severity: DEBUG and INFO records carry the logger name and call-site
//! location, WARNING and above use a compact layout. Event fields are merged
//! at the top level after the fixed fields.
//!
//! ```
//! use cw_api::logging::{Logger, SharedBuffer, Severity, Sink};
//! use cw_api::log_event;
//!
//! let buffer = SharedBuffer::new();
//! let logger = Logger::with_sinks("cw-api", Severity::Info, vec![Sink::memory(buffer.clone())]);
//!
//! log_event!(logger, Severity::Error, "upstream failed", status_code = 502u16);
//!
//! let line: serde_json::Value = serde_json::from_str(&buffer.lines()[0]).unwrap();
//! assert_eq!(line["level"], "ERROR");
//! assert_eq!(line["status_code"], 502);
//! assert!(line.get("lineno").is_none());
//! ```

pub mod error;
pub mod fields;
pub mod format;
pub mod logger;
pub mod middleware;
pub mod record;
pub mod severity;
pub mod sink;

pub use error::LoggingError;
pub use fields::FieldContext;
pub use format::{format_timestamp, BaseFormatter, DetailedFormatter, DispatchingFormatter};
pub use logger::{init, init_with_console, Logger, LoggerHandle};
pub use middleware::{generate_request_id, RequestLogContext};
pub use record::{Callsite, LogRecord};
pub use severity::{Renderer, Severity};
pub use sink::{SharedBuffer, Sink};
