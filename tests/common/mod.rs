#![allow(dead_code)]

pub use livebuild_test_utils::builders;
pub use livebuild_test_utils::{init_tracing, with_timeout};

use std::path::PathBuf;
use std::sync::Arc;

use livebuild::config::{BuildConfiguration, RunSection};
use livebuild::engine::{ControllerOptions, WatchController};
use livebuild::exec::Supervisor;
use livebuild::report::Reporter;
use livebuild::store::{ArtifactStore, MemoryStore};
use livebuild::types::ExecuteCommand;
use livebuild_test_utils::{FakeLauncher, LaunchLog, RecordingReporter};

/// A controller wired to a fake launcher and a recording reporter.
pub struct Harness {
    pub controller: WatchController<FakeLauncher>,
    pub reporter: Arc<RecordingReporter>,
    pub launches: Arc<LaunchLog>,
    pub store: Arc<MemoryStore>,
}

pub struct HarnessBuilder {
    config: BuildConfiguration,
    in_memory: bool,
    override_command: Option<ExecuteCommand>,
    base_dir: PathBuf,
    fail_first_launch: bool,
}

impl HarnessBuilder {
    pub fn new(config: BuildConfiguration) -> Self {
        Self {
            config,
            in_memory: false,
            override_command: None,
            base_dir: PathBuf::from("/project"),
            fail_first_launch: false,
        }
    }

    pub fn in_memory(mut self) -> Self {
        self.in_memory = true;
        self
    }

    pub fn override_command(mut self, cmd: ExecuteCommand) -> Self {
        self.override_command = Some(cmd);
        self
    }

    pub fn fail_first_launch(mut self) -> Self {
        self.fail_first_launch = true;
        self
    }

    pub fn build(self) -> Harness {
        let reporter = Arc::new(RecordingReporter::new());
        let store = Arc::new(MemoryStore::new());

        let mut launcher = FakeLauncher::new();
        if self.fail_first_launch {
            launcher.fail_next();
        }
        let launches = launcher.log();

        let sink: Arc<dyn Reporter> = reporter.clone();
        let supervisor = Supervisor::new(launcher, Arc::clone(&sink));
        let options = ControllerOptions {
            in_memory: self.in_memory,
            override_command: self.override_command,
            run: RunSection::default(),
            base_dir: self.base_dir,
        };
        let artifact_store: Arc<dyn ArtifactStore> = store.clone();
        let controller = WatchController::new(self.config, options, artifact_store, supervisor, sink);

        Harness {
            controller,
            reporter,
            launches,
            store,
        }
    }
}
