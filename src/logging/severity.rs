//! Record severities and their renderer binding

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::level_filters::LevelFilter;
use tracing::Level;

/// Ordered log severity: DEBUG < INFO < WARNING < ERROR < CRITICAL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE", try_from = "String")]
#[repr(u8)]
pub enum Severity {
    Debug = 10,
    Info = 20,
    Warning = 30,
    Error = 40,
    Critical = 50,
}

impl Severity {
    pub const ALL: [Severity; 5] = [
        Severity::Debug,
        Severity::Info,
        Severity::Warning,
        Severity::Error,
        Severity::Critical,
    ];

    /// Name as written in the `level` field.
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Debug => "DEBUG",
            Severity::Info => "INFO",
            Severity::Warning => "WARNING",
            Severity::Error => "ERROR",
            Severity::Critical => "CRITICAL",
        }
    }

    /// Numeric level, spaced by ten so thresholds compare as integers.
    pub fn level_number(self) -> u8 {
        self as u8
    }

    pub fn from_level_number(level: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.level_number() == level)
    }

    /// `tracing` level an event of this severity is emitted at.
    ///
    /// `tracing` stops at ERROR, so CRITICAL shares it and is told apart by
    /// the severity field each record carries.
    pub fn tracing_level(self) -> Level {
        match self {
            Severity::Debug => Level::DEBUG,
            Severity::Info => Level::INFO,
            Severity::Warning => Level::WARN,
            Severity::Error | Severity::Critical => Level::ERROR,
        }
    }

    pub fn level_filter(self) -> LevelFilter {
        LevelFilter::from_level(self.tracing_level())
    }

    /// Severity of an event that carries no explicit severity field.
    pub fn from_tracing_level(level: &Level) -> Self {
        if *level == Level::ERROR {
            Severity::Error
        } else if *level == Level::WARN {
            Severity::Warning
        } else if *level == Level::INFO {
            Severity::Info
        } else {
            Severity::Debug
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "DEBUG" => Ok(Severity::Debug),
            "INFO" => Ok(Severity::Info),
            "WARNING" | "WARN" => Ok(Severity::Warning),
            "ERROR" => Ok(Severity::Error),
            "CRITICAL" | "FATAL" => Ok(Severity::Critical),
            _ => Err(format!("Invalid log level: {}", s)),
        }
    }
}

impl TryFrom<String> for Severity {
    type Error = String;

    fn try_from(value: String) -> Result<Self, String> {
        value.parse()
    }
}

/// Which JSON layout a record is rendered with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Renderer {
    /// Compact: timestamp, level, message, fields, exception.
    Base,
    /// Adds logger name and call-site location.
    Detailed,
}

/// Fixed severity to renderer policy.
pub const RENDERER_TABLE: [(Severity, Renderer); 5] = [
    (Severity::Debug, Renderer::Detailed),
    (Severity::Info, Renderer::Detailed),
    (Severity::Warning, Renderer::Base),
    (Severity::Error, Renderer::Base),
    (Severity::Critical, Renderer::Base),
];

impl Renderer {
    /// Look up the renderer bound to `severity`; unmapped levels render as base.
    pub fn for_severity(severity: Severity) -> Self {
        RENDERER_TABLE
            .iter()
            .find(|(s, _)| *s == severity)
            .map(|(_, r)| *r)
            .unwrap_or(Renderer::Base)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Debug < Severity::Info);
        assert!(Severity::Info < Severity::Warning);
        assert!(Severity::Warning < Severity::Error);
        assert!(Severity::Error < Severity::Critical);
    }

    #[test]
    fn test_severity_from_str_aliases() {
        assert_eq!("info".parse::<Severity>().unwrap(), Severity::Info);
        assert_eq!("WARN".parse::<Severity>().unwrap(), Severity::Warning);
        assert_eq!("fatal".parse::<Severity>().unwrap(), Severity::Critical);
        assert!("trace".parse::<Severity>().is_err());
        assert!("".parse::<Severity>().is_err());
    }

    #[test]
    fn test_severity_serializes_uppercase() {
        let json = serde_json::to_string(&Severity::Warning).unwrap();
        assert_eq!(json, "\"WARNING\"");
        let parsed: Severity = serde_json::from_str("\"critical\"").unwrap();
        assert_eq!(parsed, Severity::Critical);
    }

    #[test]
    fn test_level_numbers_round_trip() {
        for severity in Severity::ALL {
            assert_eq!(
                Severity::from_level_number(severity.level_number()),
                Some(severity)
            );
        }
        assert_eq!(Severity::from_level_number(25), None);
    }

    #[test]
    fn test_try_from_string() {
        assert_eq!(Severity::try_from("Warning".to_string()), Ok(Severity::Warning));
        assert!(Severity::try_from("loud".to_string()).is_err());
    }

    #[test]
    fn test_tracing_level_mapping() {
        assert_eq!(Severity::Warning.tracing_level(), Level::WARN);
        assert_eq!(Severity::Critical.tracing_level(), Level::ERROR);
        assert_eq!(Severity::Critical.level_filter(), LevelFilter::ERROR);
        assert_eq!(Severity::Debug.level_filter(), LevelFilter::DEBUG);

        for severity in [Severity::Debug, Severity::Info, Severity::Warning, Severity::Error] {
            assert_eq!(Severity::from_tracing_level(&severity.tracing_level()), severity);
        }
        assert_eq!(Severity::from_tracing_level(&Level::TRACE), Severity::Debug);
    }

    #[test]
    fn test_renderer_table() {
        assert_eq!(Renderer::for_severity(Severity::Debug), Renderer::Detailed);
        assert_eq!(Renderer::for_severity(Severity::Info), Renderer::Detailed);
        assert_eq!(Renderer::for_severity(Severity::Warning), Renderer::Base);
        assert_eq!(Renderer::for_severity(Severity::Error), Renderer::Base);
        assert_eq!(Renderer::for_severity(Severity::Critical), Renderer::Base);
    }
}
