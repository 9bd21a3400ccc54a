//! CLI module for cw-api
//!
//! # Commands
//!
//! - `serve` - Start the HTTP service
//!
//! # Example
//!
//! ```bash
//! # Start with defaults plus environment overrides
//! cw-api serve
//!
//! # Log DEBUG records to a local file on port 8080
//! cw-api serve -p 8080 -l debug --log-file ./logs/cw-api.json
//! ```

pub mod serve;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// cw-api - structured JSON log emitter for metric-filter demos
#[derive(Parser, Debug)]
#[command(
    name = "cw-api",
    version,
    about = "Demo HTTP service emitting severity-tiered JSON logs"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP service
    Serve(ServeArgs),
}

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "cw-api.toml")]
    pub config: PathBuf,

    /// Override server port
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Override server host
    #[arg(short = 'H', long)]
    pub host: Option<String>,

    /// Minimum record severity (debug, info, warning, error, critical)
    #[arg(short, long)]
    pub log_level: Option<String>,

    /// Override the JSON log file path
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_cli_parse_serve_defaults() {
        let cli = Cli::try_parse_from(["cw-api", "serve"]).unwrap();
        let Commands::Serve(args) = cli.command;
        assert_eq!(args.config, PathBuf::from("cw-api.toml"));
        assert!(args.port.is_none());
        assert!(args.log_level.is_none());
        assert!(args.log_file.is_none());
    }

    #[test]
    fn test_cli_parse_serve_with_overrides() {
        let cli = Cli::try_parse_from([
            "cw-api",
            "serve",
            "-p",
            "9000",
            "-l",
            "debug",
            "--log-file",
            "/tmp/cw.json",
        ])
        .unwrap();
        let Commands::Serve(args) = cli.command;
        assert_eq!(args.port, Some(9000));
        assert_eq!(args.log_level.as_deref(), Some("debug"));
        assert_eq!(args.log_file, Some(PathBuf::from("/tmp/cw.json")));
    }

    #[test]
    fn test_cli_rejects_unknown_command() {
        assert!(Cli::try_parse_from(["cw-api", "backends"]).is_err());
    }
}
