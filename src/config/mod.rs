//! Configuration module for cw-api
//!
//! Provides layered configuration loading from files, environment variables, and defaults.
//!
//! # Configuration Precedence
//!
//! 1. CLI arguments (highest priority)
//! 2. Environment variables (`SERVICE_NAME`, `LOG_LEVEL`, `LOG_FILE_PATH`, ...)
//! 3. Configuration file (TOML)
//! 4. Default values (lowest priority)
//!
//! # Example
//!
//! ```rust
//! use cw_api::config::ServiceConfig;
//!
//! let config = ServiceConfig::default();
//! assert_eq!(config.service_name, "cw-api");
//! assert_eq!(config.server.port, 80);
//!
//! let toml = r#"
//! service_name = "orders-api"
//!
//! [logging]
//! level = "debug"
//! "#;
//! let config: ServiceConfig = toml::from_str(toml).unwrap();
//! assert_eq!(config.service_name, "orders-api");
//! ```

pub mod error;
pub mod logging;
pub mod server;

pub use error::ConfigError;
pub use logging::{LogFormat, LoggingConfig};
pub use server::ServerConfig;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Version reported by `/health`.
pub const SERVICE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Unified configuration for the service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Human-readable project title
    pub project_name: String,
    /// Service name, used as logger name and `app_name` field
    pub service_name: String,
    /// HTTP server configuration
    pub server: ServerConfig,
    /// Record logging and diagnostics configuration
    pub logging: LoggingConfig,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            project_name: "CloudWatch Metrics Filter Demo API".to_string(),
            service_name: "cw-api".to_string(),
            server: ServerConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl ServiceConfig {
    /// Load configuration from a TOML file
    ///
    /// If path is None, returns default configuration.
    /// If path doesn't exist, returns NotFound error.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => {
                if !p.exists() {
                    return Err(ConfigError::NotFound(p.to_path_buf()));
                }
                let content = std::fs::read_to_string(p)?;
                toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
            }
            None => Ok(Self::default()),
        }
    }

    /// Apply environment variable overrides
    ///
    /// Invalid values are silently ignored (defaults are kept).
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(name) = std::env::var("PROJECT_NAME") {
            self.project_name = name;
        }
        if let Ok(name) = std::env::var("SERVICE_NAME") {
            self.service_name = name;
        }

        if let Ok(port) = std::env::var("API_PORT") {
            if let Ok(p) = port.parse() {
                self.server.port = p;
            }
        }
        if let Ok(host) = std::env::var("API_HOST") {
            self.server.host = host;
        }

        if let Ok(level) = std::env::var("LOG_LEVEL") {
            if let Ok(l) = level.parse() {
                self.logging.level = l;
            }
        }
        if let Ok(path) = std::env::var("LOG_FILE_PATH") {
            self.logging.file_path = PathBuf::from(path);
        }
        if let Ok(format) = std::env::var("CW_API_DIAGNOSTICS_FORMAT") {
            if let Ok(f) = format.parse() {
                self.logging.diagnostics_format = f;
            }
        }

        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Validation {
                field: "server.port".to_string(),
                message: "port must be non-zero".to_string(),
            });
        }

        if self.service_name.trim().is_empty() {
            return Err(ConfigError::Validation {
                field: "service_name".to_string(),
                message: "service name cannot be empty".to_string(),
            });
        }

        if self.logging.file_path.as_os_str().is_empty() {
            return Err(ConfigError::Validation {
                field: "logging.file_path".to_string(),
                message: "log file path cannot be empty".to_string(),
            });
        }

        Ok(())
    }
}
