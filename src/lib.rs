//! cw-api - structured JSON log emitter
//!
//! An HTTP service whose endpoints exist to produce JSON log lines at chosen
//! severities, for exercising metric filters and alerting pipelines that scan
//! log streams.

pub mod api;
pub mod cli;
pub mod config;
pub mod logging;
pub mod metrics;
pub mod simulation;

/// Crates referenced by exported macros.
#[doc(hidden)]
pub mod __private {
    pub use serde_json;
    pub use tracing;
}
