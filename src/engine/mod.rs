// src/engine/mod.rs

//! Orchestration engine for livebuild.
//!
//! This module ties together:
//! - the build engine seam ([`BuildEngine`]) that produces build results in
//!   watch mode
//! - the watch subscription that keeps the engine running
//! - the controller that reacts to:
//!   - finished builds (report, then relaunch the program)
//!   - engine failures
//!   - shutdown signals
//!
//! Every event goes through one mpsc channel and is handled to completion
//! before the next one is read.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::build::BuildResult;
use crate::config::BuildConfiguration;
use crate::errors::{EngineFailure, Result};
use crate::store::ArtifactStore;

pub mod controller;
pub mod subscription;

pub use controller::{ControllerOptions, WatchController};
pub use subscription::WatchSubscription;

/// Outcome of one build attempt.
pub type BuildEvent = std::result::Result<BuildResult, EngineFailure>;

/// Events flowing into the controller from the engine and the signal handler.
#[derive(Debug, Clone)]
pub enum WatchEvent {
    /// The engine finished a build (or failed to run one).
    BuildFinished(BuildEvent),
    /// Graceful shutdown requested (e.g. Ctrl-C).
    ShutdownRequested,
}

/// Where the controller is in its watch cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    /// Not subscribed to the engine yet.
    Idle,
    /// Subscribed; waiting for (or processing) a build.
    Building,
    /// The last cycle ended without spawning (engine failure, build errors,
    /// unresolvable artifact or launch failure).
    Failed,
    /// The last cycle reported the build and spawned the program.
    Reported,
    /// Shut down; further events are ignored.
    Stopped,
}

/// A bundler driven in watch mode.
pub trait BuildEngine {
    /// Start watching. Every finished build is sent into `events` as
    /// [`WatchEvent::BuildFinished`]; output files are written to `store`.
    ///
    /// The engine stops when the returned subscription is closed or dropped.
    fn start_watch(
        &mut self,
        config: &BuildConfiguration,
        store: Arc<dyn ArtifactStore>,
        events: mpsc::Sender<WatchEvent>,
    ) -> Result<WatchSubscription>;
}
