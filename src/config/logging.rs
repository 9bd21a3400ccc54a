//! Logging configuration

use crate::logging::Severity;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;

/// Output format of the diagnostics stream (stderr)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// Pretty-printed logs for humans
    #[default]
    Pretty,
    /// JSON logs for machine parsing
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            _ => Err(format!("Invalid log format: {}", s)),
        }
    }
}

/// Logging configuration
///
/// `level` and `file_path` drive the JSON record logger. The `diagnostics_*`
/// settings only affect the service's own operational messages on stderr.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Minimum severity written to the record sinks
    pub level: Severity,
    /// Append-only JSON lines file
    pub file_path: PathBuf,
    /// `tracing` filter directives for diagnostics (overridden by `RUST_LOG`)
    pub diagnostics_level: String,
    pub diagnostics_format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Severity::Info,
            file_path: PathBuf::from("/var/log/cw-api/logs.json"),
            diagnostics_level: "warn".to_string(),
            diagnostics_format: LogFormat::Pretty,
        }
    }
}
