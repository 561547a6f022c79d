use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use livebuild::config::BuildConfiguration;
use livebuild::engine::{BuildEngine, BuildEvent, WatchEvent, WatchSubscription};
use livebuild::errors::Result;
use livebuild::store::ArtifactStore;
use tokio::sync::mpsc;

/// Flips `closed` when the subscription holding it lets go.
struct CloseFlag(Arc<AtomicBool>);

impl Drop for CloseFlag {
    fn drop(&mut self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

/// Build engine that replays a fixed list of build events.
///
/// The events are sent from a spawned task, so `start_watch` must be called
/// inside a Tokio runtime.
#[derive(Default)]
pub struct ScriptedEngine {
    script: Vec<BuildEvent>,
    closed: Arc<AtomicBool>,
    started_with: Arc<Mutex<Option<BuildConfiguration>>>,
}

impl ScriptedEngine {
    pub fn new(script: Vec<BuildEvent>) -> Self {
        Self {
            script,
            ..Default::default()
        }
    }

    /// Whether the subscription handed out by `start_watch` was closed.
    pub fn closed(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.closed)
    }

    /// Configuration the controller subscribed with.
    pub fn started_with(&self) -> Option<BuildConfiguration> {
        self.started_with.lock().unwrap().clone()
    }
}

impl BuildEngine for ScriptedEngine {
    fn start_watch(
        &mut self,
        config: &BuildConfiguration,
        _store: Arc<dyn ArtifactStore>,
        events: mpsc::Sender<WatchEvent>,
    ) -> Result<WatchSubscription> {
        *self.started_with.lock().unwrap() = Some(config.clone());

        let script = std::mem::take(&mut self.script);
        let task = tokio::spawn(async move {
            for event in script {
                if events.send(WatchEvent::BuildFinished(event)).await.is_err() {
                    break;
                }
            }
        });

        Ok(WatchSubscription::new(task).with_guard(CloseFlag(Arc::clone(&self.closed))))
    }
}
