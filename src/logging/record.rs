//! Log records decoded from `tracing` events

use super::fields::FieldContext;
use super::severity::Severity;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;
use std::fmt;
use tracing::field::{Field, Visit};
use tracing::{Event, Metadata};

/// Event field carrying the record severity, needed to tell CRITICAL from ERROR.
pub const SEVERITY_FIELD: &str = "cw.severity";
/// Event field carrying the enclosing function name.
pub const FUNCTION_FIELD: &str = "cw.func";
/// Event field carrying a serialized auxiliary argument.
pub const EXTRA_FIELD: &str = "cw.extra";
/// Event field carrying the call time in microseconds since the epoch, so
/// every sink renders the same timestamp.
pub const CREATED_FIELD: &str = "cw.created";
/// Event field rendered as the exception trace rather than as context.
pub const EXCEPTION_FIELD: &str = "exception";

/// Source location of a log call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Callsite {
    /// Rust module path, e.g. `cw_api::simulation`
    pub module: &'static str,
    /// Bare name of the enclosing function
    pub function: String,
    pub file: &'static str,
    pub line: u32,
}

impl Callsite {
    pub fn new(module: &'static str, function: impl Into<String>, file: &'static str, line: u32) -> Self {
        Self {
            module,
            function: function.into(),
            file,
            line,
        }
    }

    /// Location from event metadata; `tracing` does not know the function.
    pub fn from_metadata(metadata: &'static Metadata<'static>, function: Option<String>) -> Self {
        Self {
            module: metadata.module_path().unwrap_or_else(|| metadata.target()),
            function: function.unwrap_or_default(),
            file: metadata.file().unwrap_or("<unknown>"),
            line: metadata.line().unwrap_or(0),
        }
    }
}

/// Call time for [`CREATED_FIELD`].
#[doc(hidden)]
pub fn created_now() -> i64 {
    Utc::now().timestamp_micros()
}

/// Strip async/closure suffixes and the path prefix from a type name.
#[doc(hidden)]
pub fn bare_function_name(path: &'static str) -> &'static str {
    let mut trimmed = path;
    while let Some(rest) = trimmed.strip_suffix("::{{closure}}") {
        trimmed = rest;
    }
    trimmed.rsplit("::").next().unwrap_or(trimmed)
}

/// Name of the enclosing function, without its module path.
#[macro_export]
macro_rules! function_name {
    () => {{
        fn __here() {}
        fn __type_name_of<T>(_: T) -> &'static str {
            ::std::any::type_name::<T>()
        }
        let path = __type_name_of(__here);
        $crate::logging::record::bare_function_name(path.strip_suffix("::__here").unwrap_or(path))
    }};
}

/// A single log call, rendered once and never kept afterwards.
#[derive(Debug, Clone)]
pub struct LogRecord {
    pub created: DateTime<Utc>,
    pub severity: Severity,
    pub message: String,
    pub callsite: Callsite,
    /// Event fields in declaration order.
    pub fields: FieldContext,
    /// Auxiliary argument; only rendered when it is a JSON object.
    pub extra: Option<Value>,
    /// Formatted error trace.
    pub exception: Option<String>,
}

impl LogRecord {
    pub fn new(severity: Severity, message: impl Into<String>, callsite: Callsite) -> Self {
        Self {
            created: Utc::now(),
            severity,
            message: message.into(),
            callsite,
            fields: FieldContext::new(),
            extra: None,
            exception: None,
        }
    }

    /// Decode an event emitted by [`log_event!`](crate::log_event) or any
    /// plain `tracing` macro.
    pub fn from_event(event: &Event<'_>) -> Self {
        let metadata = event.metadata();
        let mut visitor = RecordVisitor::default();
        event.record(&mut visitor);

        Self {
            created: visitor.created.unwrap_or_else(Utc::now),
            severity: visitor
                .severity
                .unwrap_or_else(|| Severity::from_tracing_level(metadata.level())),
            message: visitor.message.unwrap_or_default(),
            callsite: Callsite::from_metadata(metadata, visitor.function),
            fields: visitor.fields,
            extra: visitor.extra,
            exception: visitor.exception,
        }
    }

    pub fn with_fields(mut self, fields: FieldContext) -> Self {
        self.fields = fields;
        self
    }

    pub fn with_extra(mut self, extra: impl Into<Value>) -> Self {
        self.extra = Some(extra.into());
        self
    }

    pub fn with_exception(mut self, trace: impl Into<String>) -> Self {
        self.exception = Some(trace.into());
        self
    }

    pub fn at(mut self, created: DateTime<Utc>) -> Self {
        self.created = created;
        self
    }

    /// Event fields followed by the auxiliary argument, when it is an object.
    pub fn context(&self) -> FieldContext {
        let mut context = self.fields.clone();
        if let Some(extra) = self.extra.as_ref().and_then(FieldContext::from_value) {
            for (key, value) in extra.iter() {
                context.insert(key.clone(), value.clone());
            }
        }
        context
    }
}

/// Splits event fields into the record parts and the field context.
#[derive(Default)]
struct RecordVisitor {
    created: Option<DateTime<Utc>>,
    message: Option<String>,
    severity: Option<Severity>,
    function: Option<String>,
    exception: Option<String>,
    extra: Option<Value>,
    fields: FieldContext,
}

impl RecordVisitor {
    fn record_value(&mut self, field: &Field, value: Value) {
        match field.name() {
            "message" => self.message = Some(into_text(value)),
            CREATED_FIELD => {
                self.created = value.as_i64().and_then(|us| Utc.timestamp_micros(us).single())
            }
            SEVERITY_FIELD => self.severity = value.as_str().and_then(|s| s.parse().ok()),
            FUNCTION_FIELD => self.function = Some(into_text(value)),
            EXTRA_FIELD => self.extra = value.as_str().and_then(|s| serde_json::from_str(s).ok()),
            EXCEPTION_FIELD => self.exception = Some(into_text(value)),
            name => self.fields.insert(name, value),
        }
    }
}

fn into_text(value: Value) -> String {
    match value {
        Value::String(s) => s,
        other => other.to_string(),
    }
}

impl Visit for RecordVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.record_value(field, Value::from(value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.record_value(field, Value::from(value));
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.record_value(field, Value::from(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.record_value(field, Value::from(value));
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.record_value(field, Value::from(value));
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.record_value(field, Value::String(format!("{value:?}")));
    }
}

/// Emit one record through a logger handle.
///
/// Fields are written as `key = value` pairs and become event fields in the
/// order given. A single trailing expression instead is treated as the
/// auxiliary argument: anything convertible into a JSON value, merged into
/// the line only when it is an object.
///
/// ```
/// use cw_api::logging::{FieldContext, Logger, Severity};
/// use cw_api::log_event;
///
/// let logger = Logger::with_sinks("docs", Severity::Info, vec![]);
/// log_event!(logger, Severity::Info, "cache warmed");
/// log_event!(logger, Severity::Warning, "slow query", table = "orders", ms = 950u64);
/// log_event!(logger, Severity::Error, "bad batch", FieldContext::new().with("rows", 3));
/// ```
#[macro_export]
macro_rules! log_event {
    ($logger:expr, $severity:expr, $message:expr $(, $key:ident = $value:expr)* $(,)?) => {
        $crate::__emit_event!($logger, $severity, $message, [$(, $key = $value)*])
    };
    ($logger:expr, $severity:expr, $message:expr, $context:expr $(,)?) => {{
        let __context: $crate::__private::serde_json::Value = ::core::convert::Into::into($context);
        $crate::__emit_event!($logger, $severity, $message, [, cw.extra = %__context])
    }};
}

#[doc(hidden)]
#[macro_export]
macro_rules! __emit_event {
    ($logger:expr, $severity:expr, $message:expr, [$($fields:tt)*]) => {{
        let __logger = &$logger;
        let __severity: $crate::logging::Severity = $severity;
        if __logger.enabled(__severity) {
            let __function = $crate::function_name!();
            let __created = $crate::logging::record::created_now();
            let __message = $message;
            __logger.emit(__severity, || match __severity {
                $crate::logging::Severity::Debug => $crate::__private::tracing::event!(
                    target: module_path!(),
                    $crate::__private::tracing::Level::DEBUG,
                    { cw.created = __created, cw.severity = __severity.as_str(), cw.func = __function $($fields)* },
                    "{}", __message
                ),
                $crate::logging::Severity::Info => $crate::__private::tracing::event!(
                    target: module_path!(),
                    $crate::__private::tracing::Level::INFO,
                    { cw.created = __created, cw.severity = __severity.as_str(), cw.func = __function $($fields)* },
                    "{}", __message
                ),
                $crate::logging::Severity::Warning => $crate::__private::tracing::event!(
                    target: module_path!(),
                    $crate::__private::tracing::Level::WARN,
                    { cw.created = __created, cw.severity = __severity.as_str(), cw.func = __function $($fields)* },
                    "{}", __message
                ),
                $crate::logging::Severity::Error | $crate::logging::Severity::Critical => {
                    $crate::__private::tracing::event!(
                        target: module_path!(),
                        $crate::__private::tracing::Level::ERROR,
                        { cw.created = __created, cw.severity = __severity.as_str(), cw.func = __function $($fields)* },
                        "{}", __message
                    )
                }
            });
        }
    }};
}
