//! JSON line formatters
//!
//! Two layouts exist: the detailed one carries call-site metadata and is used
//! for DEBUG/INFO, the base one is compact and used for everything else. The
//! [`DispatchingFormatter`] picks between them from the fixed
//! [`RENDERER_TABLE`](super::severity::RENDERER_TABLE) and is the event
//! format of every sink layer.

use super::fields::FieldContext;
use super::record::LogRecord;
use super::severity::Renderer;
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Map, Value};
use std::fmt;
use tracing::{Event, Subscriber};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;

/// UTC, microsecond precision, literal `Z`.
pub fn format_timestamp(created: &DateTime<Utc>) -> String {
    created.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn fixed_fields(record: &LogRecord) -> Map<String, Value> {
    let mut entry = Map::new();
    entry.insert(
        "timestamp".to_string(),
        Value::String(format_timestamp(&record.created)),
    );
    entry.insert(
        "level".to_string(),
        Value::String(record.severity.as_str().to_string()),
    );
    entry.insert("message".to_string(), Value::String(record.message.clone()));
    entry
}

/// Compact layout: timestamp, level, message, field context, exception.
#[derive(Debug, Clone, Copy, Default)]
pub struct BaseFormatter;

impl BaseFormatter {
    pub fn format(&self, record: &LogRecord, fields: &FieldContext) -> String {
        let mut entry = fixed_fields(record);
        fields.merge_into(&mut entry);
        if let Some(trace) = &record.exception {
            entry.insert("exception".to_string(), Value::String(trace.clone()));
        }
        Value::Object(entry).to_string()
    }
}

/// Location-rich layout for low-severity records.
#[derive(Debug, Clone)]
pub struct DetailedFormatter {
    name: String,
}

impl DetailedFormatter {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn format(&self, record: &LogRecord, fields: &FieldContext) -> String {
        let site = &record.callsite;
        let mut entry = fixed_fields(record);
        entry.insert("name".to_string(), Value::String(self.name.clone()));
        entry.insert("module".to_string(), Value::String(site.module.to_string()));
        entry.insert("funcName".to_string(), Value::String(site.function.clone()));
        entry.insert("pathname".to_string(), Value::String(site.file.to_string()));
        entry.insert("lineno".to_string(), Value::from(site.line));
        if let Some(trace) = &record.exception {
            entry.insert("exception".to_string(), Value::String(trace.clone()));
        }
        // Field context goes last so it can replace any fixed key.
        fields.merge_into(&mut entry);
        Value::Object(entry).to_string()
    }
}

/// Single formatting entry point shared by every sink.
#[derive(Debug, Clone)]
pub struct DispatchingFormatter {
    base: BaseFormatter,
    detailed: DetailedFormatter,
}

impl DispatchingFormatter {
    /// `name` is the logger name stamped on detailed records.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            base: BaseFormatter,
            detailed: DetailedFormatter::new(name),
        }
    }

    /// Render `record` as one JSON object without a trailing newline.
    ///
    /// Event fields and an object auxiliary argument are combined here and
    /// handed to the chosen layout as field context. A non-object auxiliary
    /// value is dropped.
    pub fn format(&self, record: &LogRecord) -> String {
        let fields = record.context();
        match Renderer::for_severity(record.severity) {
            Renderer::Detailed => self.detailed.format(record, &fields),
            Renderer::Base => self.base.format(record, &fields),
        }
    }
}

impl<S, N> FormatEvent<S, N> for DispatchingFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        writeln!(writer, "{}", self.format(&LogRecord::from_event(event)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::record::Callsite;
    use crate::logging::{SharedBuffer, Severity};
    use chrono::TimeZone;
    use serde_json::json;
    use tracing_subscriber::layer::SubscriberExt;

    fn fixed_record(severity: Severity) -> LogRecord {
        LogRecord::new(
            severity,
            "payment settled",
            Callsite::new(module_path!(), crate::function_name!(), file!(), line!()),
        )
        .at(Utc.with_ymd_and_hms(2024, 5, 17, 8, 30, 0).unwrap())
    }

    fn parse(line: &str) -> Map<String, Value> {
        serde_json::from_str::<Value>(line)
            .unwrap()
            .as_object()
            .cloned()
            .unwrap()
    }

    /// Run `f` under a subscriber whose only layer uses the dispatching format.
    fn capture_events(f: impl FnOnce()) -> Vec<Map<String, Value>> {
        let buffer = SharedBuffer::new();
        let subscriber = tracing_subscriber::registry().with(
            tracing_subscriber::fmt::layer()
                .event_format(DispatchingFormatter::new("cw-api"))
                .with_writer(buffer.clone()),
        );
        tracing::subscriber::with_default(subscriber, f);
        buffer.lines().iter().map(|line| parse(line)).collect()
    }

    #[test]
    fn test_timestamp_format() {
        let ts = Utc.with_ymd_and_hms(2024, 5, 17, 8, 30, 0).unwrap()
            + chrono::Duration::microseconds(123_456);
        assert_eq!(format_timestamp(&ts), "2024-05-17T08:30:00.123456Z");
    }

    #[test]
    fn test_base_layout_key_order() {
        let record = fixed_record(Severity::Error).with_exception("stack");
        let fields = FieldContext::new().with("request_id", "abc");
        let line = BaseFormatter.format(&record, &fields);

        let keys: Vec<String> = parse(&line).keys().cloned().collect();
        assert_eq!(
            keys,
            vec!["timestamp", "level", "message", "request_id", "exception"]
        );
    }

    #[test]
    fn test_detailed_layout_key_order() {
        let record = fixed_record(Severity::Info).with_exception("stack");
        let fields = FieldContext::new().with("request_id", "abc");
        let line = DetailedFormatter::new("cw-api").format(&record, &fields);

        let keys: Vec<String> = parse(&line).keys().cloned().collect();
        assert_eq!(
            keys,
            vec![
                "timestamp",
                "level",
                "message",
                "name",
                "module",
                "funcName",
                "pathname",
                "lineno",
                "exception",
                "request_id"
            ]
        );
    }

    #[test]
    fn test_detailed_location_values() {
        let line = DetailedFormatter::new("cw-api")
            .format(&fixed_record(Severity::Debug), &FieldContext::new());
        let entry = parse(&line);
        assert_eq!(entry["name"], json!("cw-api"));
        assert_eq!(entry["module"], json!("cw_api::logging::format::tests"));
        assert_eq!(entry["funcName"], json!("fixed_record"));
        assert!(entry["pathname"].as_str().unwrap().ends_with("format.rs"));
        assert!(entry["lineno"].as_u64().unwrap() > 0);
    }

    #[test]
    fn test_dispatch_by_severity() {
        let formatter = DispatchingFormatter::new("cw-api");
        for severity in Severity::ALL {
            let entry = parse(&formatter.format(&fixed_record(severity)));
            let detailed = matches!(severity, Severity::Debug | Severity::Info);
            assert_eq!(entry.contains_key("lineno"), detailed, "{severity}");
            assert_eq!(entry.contains_key("funcName"), detailed, "{severity}");
            assert_eq!(entry["level"], json!(severity.as_str()));
        }
    }

    #[test]
    fn test_dispatch_merges_object_extra() {
        let formatter = DispatchingFormatter::new("cw-api");
        let record = fixed_record(Severity::Warning).with_extra(json!({"status_code": 404}));
        let entry = parse(&formatter.format(&record));
        assert_eq!(entry["status_code"], json!(404));
    }

    #[test]
    fn test_dispatch_ignores_non_object_extra() {
        let formatter = DispatchingFormatter::new("cw-api");
        let record = fixed_record(Severity::Info).with_extra(json!(["not", "a", "map"]));
        let entry = parse(&formatter.format(&record));
        assert_eq!(entry.len(), 8);
        assert_eq!(entry["message"], json!("payment settled"));
    }

    #[test]
    fn test_field_context_overrides_fixed_fields() {
        let formatter = DispatchingFormatter::new("cw-api");
        let extra = json!({"level": "CUSTOM", "name": "other", "message": "replaced"});
        let entry = parse(&formatter.format(&fixed_record(Severity::Info).with_extra(extra.clone())));
        assert_eq!(entry["level"], json!("CUSTOM"));
        assert_eq!(entry["name"], json!("other"));
        assert_eq!(entry["message"], json!("replaced"));

        let entry = parse(&formatter.format(&fixed_record(Severity::Error).with_extra(extra)));
        assert_eq!(entry["level"], json!("CUSTOM"));
    }

    #[test]
    fn test_control_characters_stay_on_one_line() {
        let formatter = DispatchingFormatter::new("cw-api");
        let record = fixed_record(Severity::Error)
            .with_fields(FieldContext::new().with("note", "line one\nline two\t\u{1b}"))
            .with_exception("Traceback:\n  frame 1\n  frame 2\r\n");
        let line = formatter.format(&record);
        assert!(!line.contains('\n'));
        assert!(!line.chars().any(|c| c.is_control()));
        assert_eq!(parse(&line)["note"], json!("line one\nline two\t\u{1b}"));
    }

    #[test]
    fn test_format_event_reads_metadata_and_fields() {
        let entries = capture_events(|| {
            tracing::info!(request_id = "abc", attempt = 2u64, "plain event");
        });

        assert_eq!(entries.len(), 1);
        let entry = &entries[0];
        assert_eq!(entry["level"], json!("INFO"));
        assert_eq!(entry["message"], json!("plain event"));
        assert_eq!(entry["module"], json!("cw_api::logging::format::tests"));
        assert!(entry["pathname"].as_str().unwrap().ends_with("format.rs"));
        assert!(entry["lineno"].as_u64().unwrap() > 0);
        assert_eq!(entry["request_id"], json!("abc"));
        assert_eq!(entry["attempt"], json!(2));
        // Plain tracing events carry no function name.
        assert_eq!(entry["funcName"], json!(""));
    }

    #[test]
    fn test_format_event_honours_severity_field() {
        let entries = capture_events(|| {
            tracing::error!(cw.severity = "CRITICAL", exception = "trace", "ledger down");
            tracing::warn!("slow");
        });

        assert_eq!(entries[0]["level"], json!("CRITICAL"));
        assert_eq!(entries[0]["exception"], json!("trace"));
        assert!(!entries[0].contains_key("cw.severity"));
        assert!(!entries[0].contains_key("lineno"));
        assert_eq!(entries[1]["level"], json!("WARNING"));
    }
}
