// src/engine/controller.rs

//! The watch loop controller.
//!
//! [`WatchController::handle_build`] is synchronous and holds all cycle
//! semantics, so tests can feed it build events directly; [`WatchController::run`]
//! is the async shell that reads events from the channel.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::artifact::{ArtifactLocator, CommandResolver};
use crate::build::BuildResult;
use crate::config::{BuildConfiguration, RunSection};
use crate::errors::{EngineFailure, Result};
use crate::exec::{ProcessLauncher, Supervisor};
use crate::report::{format_list, format_problems, Reporter};
use crate::store::ArtifactStore;
use crate::types::ExecuteCommand;

use super::{BuildEngine, BuildEvent, ControllerState, WatchEvent, WatchSubscription};

/// Session-wide settings the controller needs besides the build targets.
#[derive(Debug, Clone)]
pub struct ControllerOptions {
    /// Run the artifact's content from the in-memory store instead of its
    /// path on disk.
    pub in_memory: bool,
    /// Command given on the command line; replaces the default on every build.
    pub override_command: Option<ExecuteCommand>,
    pub run: RunSection,
    /// Directory the bundler runs in; output paths resolve against it.
    pub base_dir: PathBuf,
}

pub struct WatchController<L: ProcessLauncher> {
    config: BuildConfiguration,
    store: Arc<dyn ArtifactStore>,
    resolver: CommandResolver,
    supervisor: Supervisor<L>,
    reporter: Arc<dyn Reporter>,
    subscription: Option<WatchSubscription>,
    state: ControllerState,
}

impl<L: ProcessLauncher> fmt::Debug for WatchController<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WatchController")
            .field("state", &self.state)
            .field("supervisor", &self.supervisor)
            .finish_non_exhaustive()
    }
}

impl<L: ProcessLauncher> WatchController<L> {
    pub fn new(
        config: BuildConfiguration,
        options: ControllerOptions,
        store: Arc<dyn ArtifactStore>,
        supervisor: Supervisor<L>,
        reporter: Arc<dyn Reporter>,
    ) -> Self {
        let locator = ArtifactLocator::new(options.base_dir, Arc::clone(&store), options.in_memory);
        let resolver = CommandResolver::new(locator, options.run, options.override_command);

        Self {
            config,
            store,
            resolver,
            supervisor,
            reporter,
            subscription: None,
            state: ControllerState::Idle,
        }
    }

    pub fn state(&self) -> ControllerState {
        self.state
    }

    pub fn supervisor(&self) -> &Supervisor<L> {
        &self.supervisor
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscription.as_ref().is_some_and(|s| !s.is_closed())
    }

    /// Subscribe to `engine` in watch mode (`Idle` → `Building`).
    pub fn start<E: BuildEngine>(&mut self, engine: &mut E, events: mpsc::Sender<WatchEvent>) -> Result<()> {
        let subscription = engine.start_watch(&self.config, Arc::clone(&self.store), events)?;
        self.subscription = Some(subscription);
        self.state = ControllerState::Building;
        info!(targets = self.config.len(), "watching for changes");
        Ok(())
    }

    /// Run one build cycle: kill the previous child, classify and report the
    /// result, then resolve and spawn the next command if the build succeeded.
    pub fn handle_build(&mut self, event: BuildEvent) -> ControllerState {
        if self.state == ControllerState::Stopped {
            debug!("controller stopped; ignoring build event");
            return self.state;
        }

        self.state = ControllerState::Building;

        // Unconditional: failed builds must not leave the old process running.
        self.supervisor.kill_current();

        self.state = match event {
            Ok(result) => self.handle_result(&result),
            Err(failure) => {
                self.report_engine_failure(&failure);
                ControllerState::Failed
            }
        };
        self.state
    }

    fn handle_result(&mut self, result: &BuildResult) -> ControllerState {
        debug!(hash = %result.hash, time_ms = result.time, "build finished");

        if result.has_errors() {
            warn!(hash = %result.hash, "build has errors; not starting process");
            self.reporter.error(&format_problems(result.all_errors()));
            return ControllerState::Failed;
        }

        if result.has_warnings() {
            self.reporter.warning(&format_problems(result.all_warnings()));
        }

        for text in format_list(result) {
            self.reporter.report(&text);
        }

        let command = match self.resolver.resolve(&self.config, result) {
            Ok(command) => command,
            Err(e) => {
                error!(error = %e, "cannot resolve command for build");
                self.reporter.error(&format!("cannot determine what to run: {e}"));
                return ControllerState::Failed;
            }
        };

        if let Err(e) = self.supervisor.spawn_next(&command) {
            error!(error = %e, cmd = %command, "failed to start process");
            self.reporter.error(&e.to_string());
            return ControllerState::Failed;
        }

        ControllerState::Reported
    }

    fn report_engine_failure(&self, failure: &EngineFailure) {
        error!(error = %failure, "build engine failure");
        self.reporter.error(&failure.message);
        if let Some(details) = &failure.details {
            self.reporter.error(details);
        }
    }

    /// Close the watch subscription and terminate the current child.
    pub fn shutdown(&mut self) {
        if self.state == ControllerState::Stopped {
            return;
        }
        if let Some(mut subscription) = self.subscription.take() {
            subscription.close();
        }
        self.supervisor.kill_current();
        self.state = ControllerState::Stopped;
        info!("controller stopped");
    }

    /// Main event loop.
    ///
    /// - Consumes `WatchEvent`s from `events` one at a time.
    /// - Feeds builds into [`handle_build`](Self::handle_build).
    /// - Shuts down on `ShutdownRequested` or when every sender is gone.
    pub async fn run(mut self, mut events: mpsc::Receiver<WatchEvent>) -> Result<()> {
        info!("livebuild controller started");

        loop {
            let event = match events.recv().await {
                Some(e) => e,
                None => {
                    info!("watch event channel closed; exiting");
                    break;
                }
            };

            match event {
                WatchEvent::BuildFinished(build) => {
                    let state = self.handle_build(build);
                    debug!(?state, "build cycle finished");
                }
                WatchEvent::ShutdownRequested => {
                    info!("shutdown requested");
                    break;
                }
            }
        }

        self.shutdown();
        Ok(())
    }
}
