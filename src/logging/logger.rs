//! Process-wide JSON record logger with console and file fan-out
//!
//! Each logger owns its own `tracing` [`Dispatch`]: a [`Registry`] with one
//! `fmt` layer per bound sink, all formatting through the same
//! [`DispatchingFormatter`]. Records are emitted inside that dispatch only,
//! so they never reach the process-wide diagnostics subscriber on stderr, and
//! diagnostics never reach the record sinks.

use super::error::LoggingError;
use super::format::DispatchingFormatter;
use super::severity::Severity;
use super::sink::Sink;
use crate::config::ServiceConfig;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex, OnceLock, PoisonError, RwLock};
use tracing::Dispatch;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{fmt, Layer, Registry};

/// Shared handle passed to every call site.
pub type LoggerHandle = Arc<Logger>;

/// One logger per service name; `init` rebinds instead of duplicating.
static REGISTRY: OnceLock<Mutex<HashMap<String, LoggerHandle>>> = OnceLock::new();

#[derive(Debug)]
struct Binding {
    dispatch: Dispatch,
    sinks: Vec<String>,
}

impl Binding {
    fn unbound() -> Self {
        Self {
            dispatch: Dispatch::none(),
            sinks: Vec::new(),
        }
    }

    fn build(name: &str, threshold: Severity, sinks: Vec<Sink>) -> Self {
        let formatter = DispatchingFormatter::new(name);
        let labels = sinks.iter().map(|s| s.label().to_string()).collect();
        let layers: Vec<Box<dyn Layer<Registry> + Send + Sync>> = sinks
            .into_iter()
            .map(|sink| {
                // Failed writes are reported on stderr by the layer itself.
                fmt::layer()
                    .log_internal_errors(true)
                    .event_format(formatter.clone())
                    .with_writer(sink.into_writer())
                    .with_filter(threshold.level_filter())
                    .boxed()
            })
            .collect();

        Self {
            dispatch: Dispatch::new(Registry::default().with(layers)),
            sinks: labels,
        }
    }
}

/// Writes each accepted record as one JSON line to every bound sink.
#[derive(Debug)]
pub struct Logger {
    name: String,
    threshold: AtomicU8,
    binding: RwLock<Binding>,
}

impl Logger {
    fn new(name: &str, threshold: Severity) -> Self {
        Self {
            name: name.to_string(),
            threshold: AtomicU8::new(threshold.level_number()),
            binding: RwLock::new(Binding::unbound()),
        }
    }

    /// Standalone logger outside the process registry.
    pub fn with_sinks(name: &str, threshold: Severity, sinks: Vec<Sink>) -> LoggerHandle {
        let logger = Self::new(name, threshold);
        logger.bind(threshold, sinks);
        Arc::new(logger)
    }

    /// The registered logger for `name`, created on first use with no sinks.
    pub fn registered(name: &str) -> LoggerHandle {
        let registry = REGISTRY.get_or_init(|| Mutex::new(HashMap::new()));
        let mut loggers = registry.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(
            loggers
                .entry(name.to_string())
                .or_insert_with(|| Arc::new(Self::new(name, Severity::Info))),
        )
    }

    /// Replace the dispatch with one built from `sinks`, and the threshold.
    ///
    /// The previous dispatch and its writers are dropped once no emission
    /// still holds them, so repeated setup never produces duplicate lines.
    pub fn bind(&self, threshold: Severity, sinks: Vec<Sink>) {
        let binding = Binding::build(&self.name, threshold, sinks);
        let mut bound = self.binding.write().unwrap_or_else(PoisonError::into_inner);
        *bound = binding;
        self.threshold
            .store(threshold.level_number(), Ordering::Release);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn threshold(&self) -> Severity {
        Severity::from_level_number(self.threshold.load(Ordering::Acquire))
            .unwrap_or(Severity::Info)
    }

    /// Severity check made before any field is evaluated.
    ///
    /// The sink layers filter on `tracing` levels, which cannot tell
    /// CRITICAL from ERROR; this check can.
    pub fn enabled(&self, severity: Severity) -> bool {
        severity.level_number() >= self.threshold.load(Ordering::Acquire)
    }

    pub fn sink_count(&self) -> usize {
        self.binding
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .sinks
            .len()
    }

    /// Labels of the bound sinks, in binding order.
    pub fn sink_labels(&self) -> Vec<String> {
        self.binding
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .sinks
            .clone()
    }

    /// Run `event` with this logger's dispatch as the current default.
    ///
    /// Called by [`log_event!`](crate::log_event); `event` is expected to
    /// fire exactly one `tracing` event.
    #[doc(hidden)]
    pub fn emit(&self, severity: Severity, event: impl FnOnce()) {
        let dispatch = self
            .binding
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .dispatch
            .clone();
        tracing::dispatcher::with_default(&dispatch, event);
        crate::metrics::record_emitted(severity);
    }
}

/// Bind the service logger to its file sink and standard output.
///
/// Safe to call more than once: the same handle is returned and its dispatch
/// is rebuilt, so a record logged afterwards appears once per sink.
pub fn init(config: &ServiceConfig) -> Result<LoggerHandle, LoggingError> {
    init_with_console(config, Sink::console())
}

/// [`init`] with a caller-supplied console sink.
pub fn init_with_console(
    config: &ServiceConfig,
    console: Sink,
) -> Result<LoggerHandle, LoggingError> {
    let logging = &config.logging;
    let file = Sink::file(&logging.file_path)?;

    let logger = Logger::registered(&config.service_name);
    logger.bind(logging.level, vec![file, console]);

    crate::log_event!(
        logger,
        Severity::Info,
        format!(
            "Logging configured for level {}. Writing to {} and console.",
            logging.level,
            logging.file_path.display()
        ),
        app_name = config.service_name.as_str()
    );

    Ok(logger)
}
