use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use livebuild::errors::{LivebuildError, Result};
use livebuild::exec::{ChildHandle, ProcessLauncher};
use livebuild::report::Reporter;
use livebuild::types::ExecuteCommand;

/// One thing the fake launcher observed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaunchOp {
    Spawn { id: usize, command: ExecuteCommand },
    Kill { id: usize },
}

/// Shared, inspectable record of launches and kills.
#[derive(Debug, Default)]
pub struct LaunchLog {
    ops: Mutex<Vec<LaunchOp>>,
    live: AtomicUsize,
    max_live: AtomicUsize,
}

impl LaunchLog {
    pub fn ops(&self) -> Vec<LaunchOp> {
        self.ops.lock().unwrap().clone()
    }

    /// Commands spawned so far, in order.
    pub fn spawned(&self) -> Vec<ExecuteCommand> {
        self.ops()
            .into_iter()
            .filter_map(|op| match op {
                LaunchOp::Spawn { command, .. } => Some(command),
                LaunchOp::Kill { .. } => None,
            })
            .collect()
    }

    pub fn kills(&self) -> usize {
        self.ops()
            .iter()
            .filter(|op| matches!(op, LaunchOp::Kill { .. }))
            .count()
    }

    /// Handles launched and not yet killed.
    pub fn live(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }

    /// Highest value `live` ever reached.
    pub fn max_live(&self) -> usize {
        self.max_live.load(Ordering::SeqCst)
    }

    fn push(&self, op: LaunchOp) {
        self.ops.lock().unwrap().push(op);
    }
}

/// A launcher that starts nothing and records every spawn and kill.
#[derive(Debug, Default)]
pub struct FakeLauncher {
    log: Arc<LaunchLog>,
    next_id: usize,
    fail_next: bool,
}

impl FakeLauncher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn log(&self) -> Arc<LaunchLog> {
        Arc::clone(&self.log)
    }

    /// Make the next `launch` call fail as if the executable were missing.
    pub fn fail_next(&mut self) {
        self.fail_next = true;
    }
}

impl ProcessLauncher for FakeLauncher {
    type Handle = FakeHandle;

    fn launch(&mut self, command: &ExecuteCommand, _reporter: Arc<dyn Reporter>) -> Result<FakeHandle> {
        if std::mem::take(&mut self.fail_next) {
            return Err(LivebuildError::Spawn {
                command: command.command.clone(),
                source: std::io::Error::from(std::io::ErrorKind::NotFound),
            });
        }

        self.next_id += 1;
        let id = self.next_id;
        self.log.push(LaunchOp::Spawn {
            id,
            command: command.clone(),
        });
        let live = self.log.live.fetch_add(1, Ordering::SeqCst) + 1;
        self.log.max_live.fetch_max(live, Ordering::SeqCst);

        Ok(FakeHandle {
            id,
            killed: false,
            log: Arc::clone(&self.log),
        })
    }
}

#[derive(Debug)]
pub struct FakeHandle {
    id: usize,
    killed: bool,
    log: Arc<LaunchLog>,
}

impl ChildHandle for FakeHandle {
    fn kill(&mut self) {
        if self.killed {
            return;
        }
        self.killed = true;
        self.log.push(LaunchOp::Kill { id: self.id });
        self.log.live.fetch_sub(1, Ordering::SeqCst);
    }

    fn killed(&self) -> bool {
        self.killed
    }

    fn pid(&self) -> Option<u32> {
        Some(self.id as u32)
    }
}
