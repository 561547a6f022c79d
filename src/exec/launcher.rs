// src/exec/launcher.rs

//! Pluggable process launcher abstraction.
//!
//! The supervisor talks to a `ProcessLauncher` instead of spawning
//! `tokio::process::Command`s itself. Production code uses
//! [`TokioLauncher`]; tests provide a launcher that records kill/spawn order
//! without starting real processes.

use std::path::PathBuf;
use std::sync::Arc;

use crate::errors::Result;
use crate::exec::child::{spawn_child, ChildProcess};
use crate::report::Reporter;
use crate::types::ExecuteCommand;

/// Handle to one launched process.
pub trait ChildHandle: Send {
    /// Request termination. Must not block waiting for the process to exit.
    fn kill(&mut self);

    /// Whether termination was already requested or the process has exited.
    fn killed(&self) -> bool;

    fn pid(&self) -> Option<u32> {
        None
    }
}

/// Trait abstracting how an `ExecuteCommand` becomes a running process.
pub trait ProcessLauncher: Send {
    type Handle: ChildHandle;

    /// Start `command`, wiring its stdout to `reporter.child_output` and its
    /// stderr to `reporter.error`, and reporting a non-zero exit code.
    fn launch(&mut self, command: &ExecuteCommand, reporter: Arc<dyn Reporter>) -> Result<Self::Handle>;
}

/// Real launcher used in production.
#[derive(Debug, Clone, Default)]
pub struct TokioLauncher {
    cwd: Option<PathBuf>,
}

impl TokioLauncher {
    /// Children inherit the current working directory.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cwd(cwd: impl Into<PathBuf>) -> Self {
        Self {
            cwd: Some(cwd.into()),
        }
    }
}

impl ProcessLauncher for TokioLauncher {
    type Handle = ChildProcess;

    fn launch(&mut self, command: &ExecuteCommand, reporter: Arc<dyn Reporter>) -> Result<ChildProcess> {
        spawn_child(command, self.cwd.as_deref(), reporter)
    }
}
