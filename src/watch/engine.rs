// src/watch/engine.rs

//! A [`BuildEngine`] that shells out to the bundler.
//!
//! The bundler is run once at startup and again after every relevant file
//! change. Its JSON stats on stdout become the `BuildResult` for that cycle.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use notify::event::{MetadataKind, ModifyKind};
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::process::Command;
use tokio::sync::mpsc;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::artifact::resolve_path;
use crate::build::BuildResult;
use crate::config::{BuildConfiguration, EngineSection};
use crate::engine::{BuildEngine, BuildEvent, WatchEvent, WatchSubscription};
use crate::errors::{EngineFailure, Result};
use crate::store::ArtifactStore;
use crate::watch::path_utils::relative_str;
use crate::watch::patterns::WatchFilter;

/// Runs `engine.command` in `root` and parses its stdout as build stats.
#[derive(Debug, Clone)]
pub struct CommandEngine {
    root: PathBuf,
    settings: EngineSection,
}

impl CommandEngine {
    pub fn new(root: impl Into<PathBuf>, settings: EngineSection) -> Self {
        let root = root.into();
        // Canonicalize once so event paths strip cleanly.
        let root = root.canonicalize().unwrap_or(root);
        Self { root, settings }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl BuildEngine for CommandEngine {
    fn start_watch(
        &mut self,
        config: &BuildConfiguration,
        store: Arc<dyn ArtifactStore>,
        events: mpsc::Sender<WatchEvent>,
    ) -> Result<WatchSubscription> {
        let filter = WatchFilter::for_session(&self.settings, config, &self.root)?;

        // Channel from the blocking notify callback into the async world.
        let (change_tx, change_rx) = mpsc::unbounded_channel::<()>();

        let mut watcher = RecommendedWatcher::new(
            {
                let root = self.root.clone();
                move |res: notify::Result<Event>| match res {
                    Ok(event) => {
                        if !is_source_change(&event.kind) {
                            return;
                        }
                        let relevant = event.paths.iter().any(|path| {
                            relative_str(&root, path).is_some_and(|rel| filter.matches(&rel))
                        });
                        if relevant {
                            // The receiver is gone once the subscription closes.
                            let _ = change_tx.send(());
                        }
                    }
                    Err(err) => {
                        // We can't easily reach the async side from here.
                        eprintln!("livebuild: file watch error: {err}");
                    }
                }
            },
            Config::default(),
        )?;

        watcher.watch(&self.root, RecursiveMode::Recursive)?;
        info!("file watcher started on {:?}", self.root);

        let job = BuildJob {
            root: self.root.clone(),
            command: self.settings.command.clone(),
            config: config.clone(),
            store,
        };
        let debounce = Duration::from_millis(self.settings.debounce_ms);
        let task = tokio::spawn(build_loop(job, debounce, change_rx, events));

        Ok(WatchSubscription::new(task).with_guard(watcher))
    }
}

/// Whether a watcher event can change what the bundler would produce.
///
/// Opens, reads and closes are dropped: the bundler itself reads every source
/// on each build, and so does the recursive watch setup.
pub fn is_source_change(kind: &EventKind) -> bool {
    match kind {
        EventKind::Create(_) | EventKind::Remove(_) => true,
        EventKind::Modify(ModifyKind::Metadata(MetadataKind::AccessTime)) => false,
        EventKind::Modify(_) => true,
        _ => false,
    }
}

/// Everything needed to run one build.
#[derive(Debug, Clone)]
pub struct BuildJob {
    pub root: PathBuf,
    pub command: String,
    pub config: BuildConfiguration,
    pub store: Arc<dyn ArtifactStore>,
}

/// Build once, then once per (debounced) batch of changes.
///
/// Changes arriving while a build runs queue up in `changes` and are folded
/// into a single follow-up build.
async fn build_loop(
    job: BuildJob,
    debounce: Duration,
    mut changes: mpsc::UnboundedReceiver<()>,
    events: mpsc::Sender<WatchEvent>,
) {
    loop {
        let event = run_build(&job).await;
        if events.send(WatchEvent::BuildFinished(event)).await.is_err() {
            debug!("controller gone; stopping build loop");
            break;
        }

        if changes.recv().await.is_none() {
            break;
        }
        sleep(debounce).await;
        while changes.try_recv().is_ok() {}
        debug!("change detected; rebuilding");
    }
}

/// Run the build command once and turn its output into a [`BuildEvent`].
pub async fn run_build(job: &BuildJob) -> BuildEvent {
    debug!(cmd = %job.command, root = ?job.root, "running build command");

    let mut cmd = if cfg!(windows) {
        let mut c = Command::new("cmd");
        c.arg("/C").arg(&job.command);
        c
    } else {
        let mut c = Command::new("sh");
        c.arg("-c").arg(&job.command);
        c
    };

    let output = cmd
        .current_dir(&job.root)
        .stdin(Stdio::null())
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|e| {
            EngineFailure::new(format!("failed to run build command `{}`", job.command))
                .with_details(e.to_string())
        })?;

    let result = parse_stats(&output.stdout).map_err(|e| {
        EngineFailure::new(format!(
            "build command `{}` did not print JSON stats ({}): {e}",
            job.command, output.status
        ))
        .with_details(String::from_utf8_lossy(&output.stderr).into_owned())
    })?;

    if !job.store.is_disk() {
        ingest_outputs(job, &result);
    }

    Ok(result)
}

/// Parse the stats document, skipping any banner printed before it.
pub fn parse_stats(stdout: &[u8]) -> serde_json::Result<BuildResult> {
    let start = stdout.iter().position(|&b| b == b'{').unwrap_or(0);
    serde_json::from_slice(&stdout[start..])
}

/// Copy every emitted asset from disk into a non-disk output store.
fn ingest_outputs(job: &BuildJob, result: &BuildResult) {
    let parts = result.parts();
    for (target, part) in job.config.targets().iter().zip(parts) {
        for asset in part.emitted_assets() {
            let path = resolve_path(
                &job.root,
                [target.context.as_str(), target.output.path.as_str(), asset.name.as_str()],
            );
            match std::fs::read(&path) {
                Ok(bytes) => {
                    if let Err(e) = job.store.write(&path, &bytes) {
                        warn!(path = ?path, error = %e, "failed to store build output");
                    }
                }
                Err(e) => warn!(path = ?path, error = %e, "emitted asset not readable"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_stats_skips_banner() {
        let stdout = b"webpack 5.0.0 compiled\n{\"hash\":\"abc\",\"time\":3}";
        let stats = parse_stats(stdout).unwrap();
        assert_eq!(stats.hash, "abc");
        assert_eq!(stats.time, 3);
    }

    #[test]
    fn reads_and_opens_are_not_source_changes() {
        use notify::event::{AccessKind, AccessMode, CreateKind, DataChange, RemoveKind};

        assert!(!is_source_change(&EventKind::Access(AccessKind::Read)));
        assert!(!is_source_change(&EventKind::Access(AccessKind::Open(AccessMode::Any))));
        assert!(!is_source_change(&EventKind::Access(AccessKind::Close(AccessMode::Write))));
        assert!(!is_source_change(&EventKind::Modify(ModifyKind::Metadata(
            MetadataKind::AccessTime
        ))));
        assert!(!is_source_change(&EventKind::Other));

        assert!(is_source_change(&EventKind::Create(CreateKind::File)));
        assert!(is_source_change(&EventKind::Modify(ModifyKind::Data(DataChange::Content))));
        assert!(is_source_change(&EventKind::Modify(ModifyKind::Name(
            notify::event::RenameMode::Both
        ))));
        assert!(is_source_change(&EventKind::Remove(RemoveKind::File)));
    }

    #[test]
    fn parse_stats_rejects_garbage() {
        assert!(parse_stats(b"Error: Cannot find module 'webpack'").is_err());
    }
}
