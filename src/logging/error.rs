//! Logger initialization errors

use std::path::PathBuf;
use thiserror::Error;

/// Failures while binding sinks. Emitting a record never returns an error.
#[derive(Error, Debug)]
pub enum LoggingError {
    #[error("Failed to create log directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to open log file {path}: {source}")]
    OpenFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
