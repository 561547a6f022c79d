// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, ValueEnum};

use crate::types::ExecuteCommand;

/// Command-line arguments for `livebuild`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "livebuild",
    version,
    about = "Rebuild on change and relaunch the built program.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// Default: `livebuild.toml` in the current working directory.
    #[arg(long, value_name = "PATH", default_value = "livebuild.toml")]
    pub config: String,

    /// Keep build outputs in memory and run the artifact's source inline.
    #[arg(short = 'm', long)]
    pub memory: bool,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `LIVEBUILD_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Don't clear the terminal on startup.
    #[arg(long)]
    pub no_clear: bool,

    /// Load and validate the config, print it, and exit without building.
    #[arg(long)]
    pub dry_run: bool,

    /// Command to run after each successful build instead of the default
    /// (`node <artifact>`), e.g. `-- python run.py`.
    #[arg(last = true, value_name = "COMMAND")]
    pub command: Vec<String>,
}

impl CliArgs {
    /// The `-- <command> [args...]` override, if one was given.
    pub fn execute_command(&self) -> Option<ExecuteCommand> {
        ExecuteCommand::from_argv(&self.command)
    }
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
