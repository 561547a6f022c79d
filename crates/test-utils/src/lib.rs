pub mod builders;
pub mod fake_engine;
pub mod fake_launcher;
pub mod recording_reporter;

use std::sync::Once;
use tracing_subscriber::{fmt, EnvFilter};

pub use fake_engine::ScriptedEngine;
pub use fake_launcher::{FakeHandle, FakeLauncher, LaunchLog, LaunchOp};
pub use recording_reporter::{Line, RecordingReporter, Sink};

static INIT: Once = Once::new();

/// Route `tracing` output into the test harness's captured output.
///
/// Shown only for failing tests (or with `--nocapture`). `RUST_LOG`
/// overrides the default of debug logs from livebuild and warnings otherwise.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("livebuild=debug,warn"));

        // Another harness may already have installed a subscriber.
        let _ = fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .try_init();
    });
}

/// Fail the test if `f` takes longer than five seconds.
pub async fn with_timeout<F, T>(f: F) -> T
where
    F: std::future::Future<Output = T>,
{
    tokio::time::timeout(std::time::Duration::from_secs(5), f)
        .await
        .expect("test timed out after 5 seconds")
}
