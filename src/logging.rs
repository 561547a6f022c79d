// src/logging.rs

//! Diagnostic logging via `tracing`.
//!
//! `--log-level` beats `LIVEBUILD_LOG`, which beats the `warn` default.
//! `LIVEBUILD_LOG` takes full filter directives, e.g.
//! `LIVEBUILD_LOG=livebuild::exec=debug,warn`.
//!
//! Everything goes to stderr. Stdout belongs to build reports and to the
//! launched program.

use anyhow::{anyhow, Result};
use tracing_subscriber::{fmt, EnvFilter};

use crate::cli::LogLevel;

pub const LOG_ENV: &str = "LIVEBUILD_LOG";

const DEFAULT_DIRECTIVE: &str = "warn";

/// Install the global subscriber. Fails if one is already installed.
pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    fmt()
        .with_env_filter(build_filter(cli_level))
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow!("installing log subscriber: {e}"))
}

fn build_filter(cli_level: Option<LogLevel>) -> EnvFilter {
    if let Some(level) = cli_level {
        return EnvFilter::new(directive(level));
    }
    // A malformed variable falls back to the default rather than aborting.
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE))
}

fn directive(level: LogLevel) -> &'static str {
    match level {
        LogLevel::Error => "error",
        LogLevel::Warn => "warn",
        LogLevel::Info => "info",
        LogLevel::Debug => "debug",
        LogLevel::Trace => "trace",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_levels_map_to_directives() {
        assert_eq!(directive(LogLevel::Warn), "warn");
        assert_eq!(directive(LogLevel::Trace), "trace");
    }

    #[test]
    fn module_directives_parse() {
        assert!(EnvFilter::try_new("livebuild::exec=debug,warn").is_ok());
    }
}
