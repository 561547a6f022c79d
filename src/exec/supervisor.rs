// src/exec/supervisor.rs

//! Owner of the single "current child process" slot.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, info};

use crate::errors::Result;
use crate::exec::launcher::{ChildHandle, ProcessLauncher};
use crate::report::Reporter;
use crate::types::ExecuteCommand;

/// Keeps at most one live child at a time.
///
/// The held handle is private; the only ways to touch it are
/// [`Supervisor::kill_current`] and [`Supervisor::spawn_next`], and the latter
/// always kills before it spawns.
pub struct Supervisor<L: ProcessLauncher> {
    launcher: L,
    current: Option<L::Handle>,
    reporter: Arc<dyn Reporter>,
}

impl<L: ProcessLauncher> fmt::Debug for Supervisor<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Supervisor")
            .field("has_child", &self.current.is_some())
            .finish_non_exhaustive()
    }
}

impl<L: ProcessLauncher> Supervisor<L> {
    pub fn new(launcher: L, reporter: Arc<dyn Reporter>) -> Self {
        Self {
            launcher,
            current: None,
            reporter,
        }
    }

    /// Request termination of the current child, if any, and forget it.
    ///
    /// Does not wait for the OS process to exit; resources it holds (e.g. a
    /// listening port) may still be busy when this returns.
    pub fn kill_current(&mut self) {
        let Some(mut handle) = self.current.take() else {
            return;
        };

        if handle.killed() {
            debug!(pid = ?handle.pid(), "previous process already exited");
        } else {
            info!(pid = ?handle.pid(), "killing previous process");
            handle.kill();
        }
    }

    /// Kill the current child, then start `command` as the new one.
    ///
    /// On a launch failure the slot stays empty.
    pub fn spawn_next(&mut self, command: &ExecuteCommand) -> Result<()> {
        self.kill_current();

        self.reporter.info("starting process ...");
        let handle = self.launcher.launch(command, Arc::clone(&self.reporter))?;
        debug!(pid = ?handle.pid(), cmd = %command, "process handle stored");
        self.current = Some(handle);

        Ok(())
    }

    /// Whether a child handle is currently held.
    pub fn has_child(&self) -> bool {
        self.current.is_some()
    }
}
