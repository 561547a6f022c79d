// src/engine/subscription.rs

use std::any::Any;
use std::fmt;

use tokio::task::JoinHandle;
use tracing::debug;

/// Keeps a build engine's watch session alive.
///
/// Holds the engine's background task and, optionally, a guard object (e.g.
/// the `notify` watcher) whose lifetime bounds the session. Closing or
/// dropping the subscription aborts the task and drops the guard.
pub struct WatchSubscription {
    task: Option<JoinHandle<()>>,
    guard: Option<Box<dyn Any + Send>>,
    closed: bool,
}

impl fmt::Debug for WatchSubscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WatchSubscription")
            .field("closed", &self.closed)
            .finish_non_exhaustive()
    }
}

impl WatchSubscription {
    pub fn new(task: JoinHandle<()>) -> Self {
        Self {
            task: Some(task),
            guard: None,
            closed: false,
        }
    }

    pub fn with_guard(mut self, guard: impl Any + Send) -> Self {
        self.guard = Some(Box::new(guard));
        self
    }

    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        self.guard.take();
        if let Some(task) = self.task.take() {
            task.abort();
        }
        debug!("watch subscription closed");
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl Drop for WatchSubscription {
    fn drop(&mut self) {
        self.close();
    }
}
